use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageReader, RgbImage};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Contour, Stage, StageArtifact};
use crate::processing::contours::{self, CONTOUR_COLOR, CONTOUR_THICKNESS};
use crate::processing::morphology::SquareKernel;
use crate::processing::preprocessing::{self, BLUR_WINDOW};

/// Tunable parameters of the stage sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineParams {
    /// Added to half the maximum grayscale intensity to form the threshold cutoff
    pub threshold_offset: i32,
    /// Edge length of the square structuring element (odd)
    pub kernel_size: u32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            threshold_offset: 30,
            kernel_size: 7,
        }
    }
}

impl PipelineParams {
    pub fn new(threshold_offset: i32, kernel_size: u32) -> Self {
        Self {
            threshold_offset,
            kernel_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        SquareKernel::new(self.kernel_size).map(|_| ())
    }
}

/// Every labeled artifact of one pipeline run, plus the contours and final image
#[derive(Clone)]
pub struct PipelineResult {
    artifacts: Vec<StageArtifact>,
    contours: Vec<Contour>,
    final_image: RgbImage,
    max_intensity: u8,
    cutoff: f32,
}

impl PipelineResult {
    /// Artifacts in stage order (always ten)
    pub fn artifacts(&self) -> &[StageArtifact] {
        &self.artifacts
    }

    pub fn get(&self, stage: Stage) -> Option<&StageArtifact> {
        self.artifacts.iter().find(|a| a.stage == stage)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.artifacts.iter().map(|a| a.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Contours of the closed mask, largest enclosed area first
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Original image with every contour outlined
    pub fn final_image(&self) -> &RgbImage {
        &self.final_image
    }

    /// Brightest value of the grayscale stage, shared by threshold and edge stages
    pub fn max_intensity(&self) -> u8 {
        self.max_intensity
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }
}

/// Runs the fixed ten-stage analysis on one color image
pub struct StageSequencer {
    params: PipelineParams,
    kernel: SquareKernel,
}

impl StageSequencer {
    pub fn new(params: PipelineParams) -> Result<Self> {
        let kernel = SquareKernel::new(params.kernel_size)?;
        Ok(Self { params, kernel })
    }

    pub fn params(&self) -> PipelineParams {
        self.params
    }

    pub fn run(&self, image: &DynamicImage) -> Result<PipelineResult> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let original = preprocessing::to_rgb(image);
        debug!("Stage 1: normalized to RGB ({}x{})", original.width(), original.height());

        let blurred = preprocessing::box_blur(&original, BLUR_WINDOW);
        debug!("Stage 2: {BLUR_WINDOW}x{BLUR_WINDOW} box blur");

        let gray = preprocessing::to_grayscale(&blurred);
        let max_intensity = preprocessing::max_intensity(&gray);
        debug!("Stage 3: grayscale, max intensity {max_intensity}");

        let cutoff = max_intensity as f32 / 2.0 + self.params.threshold_offset as f32;
        let thresh = preprocessing::threshold_binary_inv(&gray, cutoff, max_intensity);
        debug!("Stage 4: inverted threshold at {cutoff:.1}");

        let dilated = self.kernel.dilate(&thresh);
        let eroded = self.kernel.erode(&thresh);
        let opened = self.kernel.open(&thresh);
        let closed = self.kernel.close(&thresh);
        debug!("Stages 5-8: morphology with {0}x{0} kernel", self.kernel.size());

        let edge_threshold = max_intensity as f32 / 2.0;
        let edges = preprocessing::detect_edges(&gray, edge_threshold, edge_threshold);
        debug!("Stage 9: Canny edges at {edge_threshold:.1}");

        let mut found = contours::find_contours(&closed);
        contours::sort_by_area_desc(&mut found);
        let mut annotated = original.clone();
        contours::draw_contours(&mut annotated, &found, CONTOUR_COLOR, CONTOUR_THICKNESS);
        debug!("Stage 10: {} contours drawn", found.len());

        let artifacts = vec![
            color(Stage::Original, original),
            color(Stage::Blur, blurred),
            luma(Stage::Grayscale, gray),
            luma(Stage::Threshold, thresh),
            luma(Stage::Dilate, dilated),
            luma(Stage::Erode, eroded),
            luma(Stage::Open, opened),
            luma(Stage::Close, closed),
            luma(Stage::Edges, edges),
            color(Stage::Contours, annotated.clone()),
        ];

        Ok(PipelineResult {
            artifacts,
            contours: found,
            final_image: annotated,
            max_intensity,
            cutoff,
        })
    }
}

fn color(stage: Stage, image: RgbImage) -> StageArtifact {
    StageArtifact {
        stage,
        image: DynamicImage::ImageRgb8(image),
    }
}

fn luma(stage: Stage, image: GrayImage) -> StageArtifact {
    StageArtifact {
        stage,
        image: DynamicImage::ImageLuma8(image),
    }
}

/// Run the stage sequence on an already decoded image
pub fn process_image(image: &DynamicImage, params: PipelineParams) -> Result<PipelineResult> {
    StageSequencer::new(params)?.run(image)
}

/// Decode an image file and run the stage sequence on it
pub fn process_file(path: impl AsRef<Path>, params: PipelineParams) -> Result<PipelineResult> {
    let path = path.as_ref();
    let sequencer = StageSequencer::new(params)?;

    info!("Processing {}", path.display());
    let image = load_image(path)?;
    let result = sequencer.run(&image)?;
    info!(
        "{}: {} contours (max intensity {}, cutoff {:.1})",
        path.display(),
        result.contours().len(),
        result.max_intensity(),
        result.cutoff()
    );
    Ok(result)
}

/// Open and decode an image, mapping both IO and codec failures to input errors
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let input_error = |source| Error::Input {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(|e| input_error(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| input_error(image::ImageError::IoError(e)))?
        .decode()
        .map_err(input_error)
}

/// Writes every stage artifact of a run to disk for inspection
#[derive(Clone, Debug)]
pub struct DebugDump {
    output_dir: PathBuf,
}

impl DebugDump {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(Error::InvalidArgument(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save `<dir>/<basename>/<NN>_<label>.png` for each artifact
    pub fn write(&self, basename: &str, result: &PipelineResult) -> Result<Vec<PathBuf>> {
        let image_dir = self.output_dir.join(basename);
        std::fs::create_dir_all(&image_dir)?;

        let mut written = Vec::with_capacity(result.len());
        for artifact in result.artifacts() {
            let path = image_dir.join(format!("{}.png", artifact.stage.file_stem()));
            artifact.image.save(&path).map_err(|source| Error::Output {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }

        debug!("Debug: saved {} images to {}/", written.len(), image_dir.display());
        Ok(written)
    }
}
