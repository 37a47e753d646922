//! Evaluation metrics for held-out predictions.
//!
//! All functions take class indices; `classes` supplies display names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of predictions equal to the truth (0 for empty input)
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// Row name for held-out labels that no training row carried
pub const UNSEEN_CLASS: &str = "(unseen)";

/// Precision/recall/F1 of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and support-weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Only classes that occur in `truth` or `predicted` are reported.
    ///
    /// Truth indices past the end of `classes` are labels the model never
    /// saw; they share one [`UNSEEN_CLASS`] row that can never be predicted.
    pub fn new(truth: &[usize], predicted: &[usize], classes: &[String]) -> Self {
        let confusion = ConfusionMatrix::new(truth, predicted, classes);
        let total = truth.len();

        let mut rows = Vec::new();
        for (i, class) in classes.iter().enumerate() {
            let tp = confusion.matrix[i][i];
            let support: usize = confusion.matrix[i].iter().sum();
            let predicted_count: usize = confusion.matrix.iter().map(|row| row[i]).sum();
            if support == 0 && predicted_count == 0 {
                continue;
            }
            let precision = ratio(tp, predicted_count);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            rows.push(ClassMetrics {
                class: class.clone(),
                precision,
                recall,
                f1,
                support,
            });
        }

        let unseen = truth.iter().filter(|&&t| t >= classes.len()).count();
        if unseen > 0 {
            rows.push(ClassMetrics {
                class: UNSEEN_CLASS.to_string(),
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
                support: unseen,
            });
        }

        let n = rows.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            class: "macro avg".to_string(),
            precision: rows.iter().map(|r| r.precision).sum::<f64>() / n,
            recall: rows.iter().map(|r| r.recall).sum::<f64>() / n,
            f1: rows.iter().map(|r| r.f1).sum::<f64>() / n,
            support: total,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                rows.iter().map(|r| f(r) * r.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            class: "weighted avg".to_string(),
            precision: weight(|r| r.precision),
            recall: weight(|r| r.recall),
            f1: weight(|r| r.f1),
            support: total,
        };

        Self {
            classes: rows,
            accuracy: accuracy(truth, predicted),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.class.len())
            .chain([12])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        let row = |f: &mut fmt::Formatter<'_>, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                m.class, m.precision, m.recall, m.f1, m.support
            )
        };
        for m in &self.classes {
            row(f, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}

/// Counts of (true class, predicted class) pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    /// `matrix[truth][predicted]`
    pub matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(truth: &[usize], predicted: &[usize], classes: &[String]) -> Self {
        let n = classes.len();
        let mut matrix = vec![vec![0; n]; n];
        for (&t, &p) in truth.iter().zip(predicted) {
            if t < n && p < n {
                matrix[t][p] += 1;
            }
        }
        Self {
            labels: classes.to_vec(),
            matrix,
        }
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.matrix.len()).map(|i| self.matrix[i][i]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.labels.iter().map(String::len).max().unwrap_or(0).max(4);
        write!(f, "{:>width$}", "")?;
        for idx in 0..self.labels.len() {
            write!(f, " {:>5}", format!("[{idx}]"))?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "{label:>width$}")?;
            for count in row {
                write!(f, " {count:>5}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["Poll".into(), "Quiz".into(), "Project".into()]
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 1, 2], &[0, 1, 0, 2]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_confusion_matrix() {
        let cm = ConfusionMatrix::new(&[0, 1, 1, 2], &[0, 1, 0, 2], &classes());
        assert_eq!(cm.matrix, vec![vec![1, 0, 0], vec![1, 1, 0], vec![0, 0, 1]]);
        assert_eq!(cm.total(), 4);
        assert_eq!(cm.correct(), 3);
        assert!(cm.to_string().contains("Quiz"));
    }

    #[test]
    fn test_classification_report() {
        let report = ClassificationReport::new(&[0, 1, 1, 2], &[0, 1, 0, 2], &classes());
        assert_eq!(report.classes.len(), 3);

        let poll = &report.classes[0];
        assert_eq!(poll.precision, 0.5);
        assert_eq!(poll.recall, 1.0);
        assert_eq!(poll.support, 1);

        let quiz = &report.classes[1];
        assert_eq!(quiz.precision, 1.0);
        assert_eq!(quiz.recall, 0.5);

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.weighted_avg.support, 4);
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-12);
        assert!(report.to_string().contains("macro avg"));
    }

    #[test]
    fn test_unseen_labels_get_their_own_row() {
        // Index 3 is past the end of classes()
        let report = ClassificationReport::new(&[0, 1, 3, 3], &[0, 1, 0, 1], &classes());

        let unseen = report.classes.last().unwrap();
        assert_eq!(unseen.class, UNSEEN_CLASS);
        assert_eq!(unseen.support, 2);
        assert_eq!(unseen.recall, 0.0);

        let supports: usize = report.classes.iter().map(|c| c.support).sum();
        assert_eq!(supports, report.weighted_avg.support);
        assert!((report.weighted_avg.recall - report.accuracy).abs() < 1e-12);
        assert_eq!(report.accuracy, 0.5);
    }

    #[test]
    fn test_absent_classes_skipped() {
        let report = ClassificationReport::new(&[1, 1], &[1, 1], &classes());
        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.macro_avg.f1, 1.0);
    }
}
