use crate::detection::FaceRegion;

/// One line per face, in face order: `Face {id} smile: 0.87` or
/// `Face {id} smile: unknown` when the probability is missing or out of range.
pub fn smile_report(faces: &[FaceRegion]) -> Vec<String> {
    faces.iter().map(smile_line).collect()
}

fn smile_line(face: &FaceRegion) -> String {
    match face.smile_probability() {
        Some(p) if (0.0..=1.0).contains(&p) => format!("Face {} smile: {p:.2}", face.id()),
        _ => format!("Face {} smile: unknown", face.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rect;

    fn face(id: u32, smile: Option<f32>) -> FaceRegion {
        FaceRegion::new(id, Rect::new(0, 0, 10, 10).unwrap(), smile)
    }

    #[test]
    fn formats_probability_with_two_decimals() {
        assert_eq!(smile_report(&[face(1, Some(0.87))]), vec!["Face 1 smile: 0.87"]);
        assert_eq!(smile_report(&[face(3, Some(0.123))]), vec!["Face 3 smile: 0.12"]);
        assert_eq!(smile_report(&[face(2, Some(1.0))]), vec!["Face 2 smile: 1.00"]);
        assert_eq!(smile_report(&[face(4, Some(0.0))]), vec!["Face 4 smile: 0.00"]);
    }

    #[test]
    fn missing_or_invalid_probability_is_unknown() {
        assert_eq!(smile_report(&[face(1, None)]), vec!["Face 1 smile: unknown"]);
        assert_eq!(smile_report(&[face(1, Some(-1.0))]), vec!["Face 1 smile: unknown"]);
        assert_eq!(smile_report(&[face(1, Some(1.5))]), vec!["Face 1 smile: unknown"]);
        assert_eq!(smile_report(&[face(1, Some(f32::NAN))]), vec!["Face 1 smile: unknown"]);
    }

    #[test]
    fn keeps_face_order() {
        let lines = smile_report(&[face(1, Some(0.5)), face(2, None), face(3, Some(0.25))]);
        assert_eq!(
            lines,
            vec![
                "Face 1 smile: 0.50",
                "Face 2 smile: unknown",
                "Face 3 smile: 0.25",
            ]
        );
    }

    #[test]
    fn no_faces_no_lines() {
        assert!(smile_report(&[]).is_empty());
    }
}
