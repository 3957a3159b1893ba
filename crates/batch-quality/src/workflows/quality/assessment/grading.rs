use super::super::domain::{QualityGrade, QualityStatus};

/// Maps a score to its grade; each band includes its lower bound.
pub fn grade_for(score: f64) -> QualityGrade {
    if score >= 90.0 {
        QualityGrade::A
    } else if score >= 80.0 {
        QualityGrade::B
    } else if score >= 70.0 {
        QualityGrade::C
    } else if score >= 60.0 {
        QualityGrade::D
    } else {
        QualityGrade::F
    }
}

pub fn classify(score: f64) -> (QualityGrade, QualityStatus) {
    let grade = grade_for(score);
    (grade, grade.status())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_lower_inclusive() {
        assert_eq!(grade_for(100.0), QualityGrade::A);
        assert_eq!(grade_for(90.0), QualityGrade::A);
        assert_eq!(grade_for(89.99), QualityGrade::B);
        assert_eq!(grade_for(80.0), QualityGrade::B);
        assert_eq!(grade_for(79.99), QualityGrade::C);
        assert_eq!(grade_for(70.0), QualityGrade::C);
        assert_eq!(grade_for(60.0), QualityGrade::D);
        assert_eq!(grade_for(59.99), QualityGrade::F);
        assert_eq!(grade_for(0.0), QualityGrade::F);
    }

    #[test]
    fn grade_and_status_move_together() {
        assert_eq!(classify(95.0), (QualityGrade::A, QualityStatus::Excellent));
        assert_eq!(classify(85.0), (QualityGrade::B, QualityStatus::Good));
        assert_eq!(classify(75.0), (QualityGrade::C, QualityStatus::Fair));
        assert_eq!(classify(65.0), (QualityGrade::D, QualityStatus::Poor));
        assert_eq!(classify(12.5), (QualityGrade::F, QualityStatus::Failed));
    }
}
