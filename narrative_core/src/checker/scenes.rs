//! Pacing rules over scene annotations.

use super::Findings;
use crate::annotations::Annotation;

const TENSION_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

pub(super) fn check_scenes(scenes: &[Annotation], findings: &mut Findings) {
    if scenes.is_empty() {
        return;
    }

    let mut tensions = Vec::new();
    let mut emotions = Vec::new();

    for scene in scenes {
        if let Some(raw) = scene.attributes.get("tension") {
            match raw.trim().parse::<i64>() {
                Ok(tension) => {
                    if !TENSION_RANGE.contains(&tension) {
                        findings.issue(format!("scene tension out of range (1-10): {}", tension));
                    }
                    // Out-of-range values still count toward pacing.
                    tensions.push(tension);
                }
                Err(_) => findings.issue(format!("scene tension is not a number: {}", raw)),
            }
        }
        if let Some(emotion) = scene.attr("emotion") {
            emotions.push(emotion);
        }
    }

    if !tensions.is_empty() && tensions.iter().all(|t| *t < 3) {
        findings.warn("every scene tension is below 3; the chapter may read flat".to_string());
    }
    if !tensions.is_empty() && tensions.iter().all(|t| *t > 8) {
        findings.warn("every scene tension is above 8; fatigue risk".to_string());
    }
    if emotions.len() >= 3 && emotions.iter().all(|e| *e == emotions[0]) {
        findings.warn(format!("scene emotion is monotone: {}", emotions[0]));
    }
}
