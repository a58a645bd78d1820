use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use log::info;

use crate::error::{Error, Result};
use crate::layout::{GridShape, plan_grid};
use crate::models::Stage;
use crate::pipeline::PipelineResult;

/// Pixel size of one panel cell in composed figures
pub const PANEL_SIZE: u32 = 320;

/// Gap between panels and around the figure border
pub const PANEL_MARGIN: u32 = 12;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Stages shown in the first and second half of the batch step report
pub const REPORT_PART_ONE: [Stage; 5] = [
    Stage::Original,
    Stage::Blur,
    Stage::Grayscale,
    Stage::Threshold,
    Stage::Dilate,
];
pub const REPORT_PART_TWO: [Stage; 5] = [
    Stage::Erode,
    Stage::Open,
    Stage::Close,
    Stage::Edges,
    Stage::Contours,
];

/// Scale `image` to fit a `PANEL_SIZE` square while keeping its aspect ratio
fn fit_panel(image: &DynamicImage) -> RgbImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return RgbImage::from_pixel(1, 1, BACKGROUND);
    }

    let scale = (PANEL_SIZE as f32 / width as f32).min(PANEL_SIZE as f32 / height as f32);
    let scaled_w = ((width as f32 * scale) as u32).max(1);
    let scaled_h = ((height as f32 * scale) as u32).max(1);
    imageops::resize(&rgb, scaled_w, scaled_h, FilterType::Triangle)
}

/// Compose panels onto a white canvas following `grid`
fn compose(grid: GridShape, panels: &[DynamicImage]) -> RgbImage {
    let step = PANEL_SIZE + PANEL_MARGIN;
    let width = grid.columns as u32 * step + PANEL_MARGIN;
    let height = grid.rows as u32 * step + PANEL_MARGIN;
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    for (index, panel) in panels.iter().enumerate() {
        let Some((row, column)) = grid.cell(index) else {
            break;
        };
        let scaled = fit_panel(panel);
        // center inside the cell
        let x = PANEL_MARGIN + column as u32 * step + (PANEL_SIZE - scaled.width()) / 2;
        let y = PANEL_MARGIN + row as u32 * step + (PANEL_SIZE - scaled.height()) / 2;
        imageops::overlay(&mut canvas, &scaled, x.into(), y.into());
    }

    canvas
}

/// All ten stage artifacts of one image, arranged by the grid planner
pub fn render_stage_grid(result: &PipelineResult) -> Result<RgbImage> {
    let grid = plan_grid(result.len())?;
    let panels: Vec<DynamicImage> = result.artifacts().iter().map(|a| a.image.clone()).collect();
    Ok(compose(grid, &panels))
}

/// The contour-annotated image on its own
pub fn render_final(result: &PipelineResult) -> RgbImage {
    result.final_image().clone()
}

/// Final images of several runs side by side
pub fn render_comparison(finals: &[&RgbImage]) -> Result<RgbImage> {
    if finals.is_empty() {
        return Err(Error::InvalidArgument(
            "comparison needs at least one image".to_string(),
        ));
    }
    let grid = GridShape {
        rows: 1,
        columns: finals.len(),
    };
    let panels: Vec<DynamicImage> = finals
        .iter()
        .map(|img| DynamicImage::ImageRgb8((*img).clone()))
        .collect();
    Ok(compose(grid, &panels))
}

/// One row per run, one column per requested stage
pub fn render_stage_report(results: &[&PipelineResult], stages: &[Stage]) -> Result<RgbImage> {
    if results.is_empty() || stages.is_empty() {
        return Err(Error::InvalidArgument(
            "stage report needs at least one run and one stage".to_string(),
        ));
    }
    let grid = GridShape {
        rows: results.len(),
        columns: stages.len(),
    };

    let mut panels = Vec::with_capacity(grid.capacity());
    for result in results {
        for stage in stages {
            let panel = result
                .get(*stage)
                .map(|a| a.image.clone())
                .unwrap_or_else(|| DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, BACKGROUND)));
            panels.push(panel);
        }
    }
    Ok(compose(grid, &panels))
}

/// Writes the figures of a batch run under one output directory
#[derive(Clone, Debug)]
pub struct FigureWriter {
    output_dir: PathBuf,
}

impl FigureWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn save(&self, file_name: &str, image: &RgbImage) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        image.save(&path).map_err(|source| Error::Output {
            path: path.clone(),
            source,
        })?;
        info!("Saved {}", path.display());
        Ok(path)
    }

    /// `<basename>_intermediarias.png` and `<basename>_final.png`
    pub fn write_image_figures(&self, basename: &str, result: &PipelineResult) -> Result<Vec<PathBuf>> {
        let grid = render_stage_grid(result)?;
        Ok(vec![
            self.save(&format!("{basename}_intermediarias.png"), &grid)?,
            self.save(&format!("{basename}_final.png"), &render_final(result))?,
        ])
    }

    /// `resultados_finais.png` plus the two-part stage report
    pub fn write_batch_figures(&self, results: &[&PipelineResult]) -> Result<Vec<PathBuf>> {
        let finals: Vec<&RgbImage> = results.iter().map(|r| r.final_image()).collect();
        Ok(vec![
            self.save("resultados_finais.png", &render_comparison(&finals)?)?,
            self.save(
                "relatorio_etapas_parte1.png",
                &render_stage_report(results, &REPORT_PART_ONE)?,
            )?,
            self.save(
                "relatorio_etapas_parte2.png",
                &render_stage_report(results, &REPORT_PART_TWO)?,
            )?,
        ])
    }
}
