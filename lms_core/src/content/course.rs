use crate::error::{AppError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref COURSE_KEY: Regex =
        Regex::new(r"^course-v1:[A-Za-z0-9_.~-]+\+[A-Za-z0-9_.~-]+\+[A-Za-z0-9_.~-]+$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub course_id: String,
    pub display_name: String,
    /// Usage key of the course root block.
    pub root: String,
    #[serde(default)]
    pub upgrade_url: Option<String>,
}

pub fn validate_course_id(course_id: &str) -> Result<()> {
    if COURSE_KEY.is_match(course_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid course id: {}", course_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_course_id() {
        assert!(validate_course_id("course-v1:edX+DemoX+2026").is_ok());
        assert!(validate_course_id("course-v1:Open_edX+CS-101+2026.T1").is_ok());

        assert!(validate_course_id("edX/DemoX/2026").is_err());
        assert!(validate_course_id("course-v1:edX+DemoX").is_err());
        assert!(validate_course_id("course-v1:edX+Demo X+2026").is_err());
        assert!(validate_course_id("").is_err());
    }
}
