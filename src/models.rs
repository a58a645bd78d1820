use image::DynamicImage;
use imageproc::point::Point;

/// The ten artifacts produced for every input image, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Original,
    Blur,
    Grayscale,
    Threshold,
    Dilate,
    Erode,
    Open,
    Close,
    Edges,
    Contours,
}

/// Pixel representation of a stage artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Color,
    Grayscale,
    Binary,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Original,
        Stage::Blur,
        Stage::Grayscale,
        Stage::Threshold,
        Stage::Dilate,
        Stage::Erode,
        Stage::Open,
        Stage::Close,
        Stage::Edges,
        Stage::Contours,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Original => "Original",
            Stage::Blur => "Blur",
            Stage::Grayscale => "Grayscale",
            Stage::Threshold => "Threshold",
            Stage::Dilate => "Dilate",
            Stage::Erode => "Erode",
            Stage::Open => "Open",
            Stage::Close => "Close",
            Stage::Edges => "Edges",
            Stage::Contours => "Contours",
        }
    }

    /// 1-based position in the pipeline
    pub fn number(&self) -> usize {
        Stage::ALL.iter().position(|s| s == self).map_or(0, |i| i + 1)
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Original | Stage::Blur | Stage::Contours => StageKind::Color,
            Stage::Grayscale => StageKind::Grayscale,
            _ => StageKind::Binary,
        }
    }

    /// File-name friendly form, e.g. "04_threshold"
    pub fn file_stem(&self) -> String {
        format!("{:02}_{}", self.number(), self.label().to_lowercase().replace(' ', "_"))
    }
}

/// One labeled intermediate (or final) image
#[derive(Clone)]
pub struct StageArtifact {
    pub stage: Stage,
    pub image: DynamicImage,
}

impl StageArtifact {
    pub fn label(&self) -> &'static str {
        self.stage.label()
    }
}

/// Whether a border surrounds a foreground region or a hole inside one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    Outer,
    Hole,
}

/// A closed boundary found in the closed binary mask
#[derive(Debug, Clone)]
pub struct Contour {
    /// Position in discovery (raster scan) order
    pub index: usize,
    /// Discovery index of the enclosing border, if any
    pub parent: Option<usize>,
    pub kind: BorderKind,
    /// Compressed polygon: only the end points of straight runs are kept
    pub points: Vec<Point<i32>>,
    pub area: f64,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_numbers_follow_pipeline_order() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.number(), i + 1);
        }
        assert_eq!(Stage::Threshold.file_stem(), "04_threshold");
        assert_eq!(Stage::Contours.file_stem(), "10_contours");
    }

    #[test]
    fn color_stages() {
        let color: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|s| s.kind() == StageKind::Color)
            .collect();
        assert_eq!(color, vec![Stage::Original, Stage::Blur, Stage::Contours]);
    }

    #[test]
    fn contour_bounds() {
        let contour = Contour {
            index: 0,
            parent: None,
            kind: BorderKind::Outer,
            points: vec![Point::new(2, 3), Point::new(8, 3), Point::new(8, 9), Point::new(2, 9)],
            area: 36.0,
        };
        assert_eq!(contour.bounds(), Some((2, 3, 8, 9)));
    }
}
