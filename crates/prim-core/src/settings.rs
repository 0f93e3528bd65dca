/// Tunables shared by the evaluators.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvaluatorSettings {
    /// Number of line segments each cubic span is split into for the spatial index.
    pub segments_per_span: usize,
    /// Number of polyline samples per cubic span used by arc length.
    pub arc_length_samples_per_span: usize,
}

impl EvaluatorSettings {
    pub const DEFAULT_SEGMENTS_PER_SPAN: usize = 16;
    pub const DEFAULT_ARC_LENGTH_SAMPLES_PER_SPAN: usize = 32;

    pub fn new(segments_per_span: usize, arc_length_samples_per_span: usize) -> Self {
        Self {
            segments_per_span,
            arc_length_samples_per_span,
        }
        .sanitized()
    }

    /// Clamp sample counts to at least one.
    pub fn sanitized(self) -> Self {
        Self {
            segments_per_span: self.segments_per_span.max(1),
            arc_length_samples_per_span: self.arc_length_samples_per_span.max(1),
        }
    }
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            segments_per_span: Self::DEFAULT_SEGMENTS_PER_SPAN,
            arc_length_samples_per_span: Self::DEFAULT_ARC_LENGTH_SAMPLES_PER_SPAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = EvaluatorSettings::default();
        assert_eq!(s.segments_per_span, EvaluatorSettings::DEFAULT_SEGMENTS_PER_SPAN);
        assert_eq!(
            s.arc_length_samples_per_span,
            EvaluatorSettings::DEFAULT_ARC_LENGTH_SAMPLES_PER_SPAN
        );
    }

    #[test]
    fn test_sanitized_clamps_zero_counts() {
        let s = EvaluatorSettings::new(0, 0);
        assert_eq!(s.segments_per_span, 1);
        assert_eq!(s.arc_length_samples_per_span, 1);
    }
}
