use anyhow::Result;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc::{self, FONT_HERSHEY_PLAIN, LINE_8};
use opencv::prelude::*;

use crate::calibration::DistanceRange;

const MARGIN: i32 = 10;
const ROW_HEIGHT: i32 = 15;
const COLUMN_WIDTH: i32 = 50;
const FPS_RIGHT_OFFSET: i32 = 70;
const FONT_SCALE: f64 = 1.0;
const BOX_THICKNESS: i32 = 3;

pub const HEADER: &str = "Face number and its distance:";

fn green() -> Scalar {
    Scalar::new(0., 255., 0., 0.)
}

fn blue() -> Scalar {
    Scalar::new(255., 0., 0., 0.)
}

fn red() -> Scalar {
    Scalar::new(0., 0., 255., 0.)
}

pub fn header_origin() -> Point {
    Point::new(MARGIN, 2 * MARGIN)
}

/// Origins of the index and distance columns of row `row`.
pub fn row_origins(row: usize) -> (Point, Point) {
    let y = 2 * MARGIN + ROW_HEIGHT * (row as i32 + 1);
    (Point::new(MARGIN, y), Point::new(MARGIN + COLUMN_WIDTH, y))
}

pub fn fps_origin(frame_width: i32) -> Point {
    Point::new(frame_width - FPS_RIGHT_OFFSET, ROW_HEIGHT)
}

pub fn distance_label(range: &DistanceRange) -> String {
    format!("~({} : {})", range.min, range.max)
}

fn text(img: &mut Mat, label: &str, origin: Point, color: Scalar) -> Result<()> {
    imgproc::put_text(
        img,
        label,
        origin,
        FONT_HERSHEY_PLAIN,
        FONT_SCALE,
        color,
        1,
        LINE_8,
        false,
    )?;
    Ok(())
}

pub fn select_faces(img: &mut Mat, faces: &[Rect]) -> Result<()> {
    for face in faces {
        imgproc::rectangle(img, *face, green(), BOX_THICKNESS, LINE_8, 0)?;
    }
    Ok(())
}

pub fn draw_distances(img: &mut Mat, distances: &[DistanceRange]) -> Result<()> {
    text(img, HEADER, header_origin(), blue())?;
    for (idx, range) in distances.iter().enumerate() {
        let (index_at, range_at) = row_origins(idx);
        text(img, &idx.to_string(), index_at, red())?;
        text(img, &distance_label(range), range_at, red())?;
    }
    Ok(())
}

pub fn draw_fps(img: &mut Mat, fps: u32) -> Result<()> {
    let origin = fps_origin(img.cols());
    text(img, &format!("FPS: {fps}"), origin, red())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_stack_below_header() {
        assert_eq!(header_origin(), Point::new(10, 20));
        assert_eq!(row_origins(0), (Point::new(10, 35), Point::new(60, 35)));
        assert_eq!(row_origins(2), (Point::new(10, 65), Point::new(60, 65)));
    }

    #[test]
    fn test_fps_anchored_to_right_edge() {
        assert_eq!(fps_origin(640), Point::new(570, 15));
    }

    #[test]
    fn test_distance_label() {
        assert_eq!(distance_label(&DistanceRange::new(25, 45)), "~(25 : 45)");
    }
}
