use super::{check_shape, Visualizer};
use crate::db::QueryRow;
use crate::error::Result;
use std::io::Write;

const LABEL_WIDTH_MAX: usize = 40;

/// 终端文本渲染
pub struct TextRenderer<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 40 }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn title(&mut self, title: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "== {} ==", title)?;
        Ok(())
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn pad(text: &str, width: usize) -> String {
    let shown: String = text.chars().take(width).collect();
    let fill = width.saturating_sub(shown.chars().count());
    format!("{}{}", shown, " ".repeat(fill))
}

fn label_width(labels: &[String]) -> usize {
    labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(LABEL_WIDTH_MAX)
}

impl<W: Write> Visualizer for TextRenderer<W> {
    fn render_bar_chart(&mut self, labels: &[String], values: &[f64], title: &str) -> Result<()> {
        check_shape(labels, values)?;
        self.title(title)?;

        let max = values.iter().cloned().fold(0.0_f64, f64::max);
        let label_width = label_width(labels);
        for (label, value) in labels.iter().zip(values) {
            let len = if max > 0.0 {
                ((value / max) * self.width as f64).round().max(0.0) as usize
            } else {
                0
            };
            writeln!(
                self.out,
                "{} | {} {}",
                pad(label, label_width),
                "█".repeat(len),
                format_value(*value)
            )?;
        }
        Ok(())
    }

    fn render_line_chart(&mut self, x_labels: &[String], y_values: &[f64], title: &str) -> Result<()> {
        check_shape(x_labels, y_values)?;
        self.title(title)?;

        let min = y_values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = y_values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let label_width = label_width(x_labels);
        for (label, value) in x_labels.iter().zip(y_values) {
            // 点的位置在 [min, max] 之间线性映射
            let pos = if max > min {
                (((value - min) / (max - min)) * (self.width - 1) as f64).round() as usize
            } else {
                0
            };
            writeln!(
                self.out,
                "{} | {}•{} {}",
                pad(label, label_width),
                "·".repeat(pos),
                " ".repeat(self.width - 1 - pos),
                format_value(*value)
            )?;
        }
        Ok(())
    }

    fn render_table(&mut self, rows: &[QueryRow]) -> Result<()> {
        let Some(first) = rows.first() else {
            writeln!(self.out, "(no rows)")?;
            return Ok(());
        };

        let headers: Vec<&String> = first.keys().collect();
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| row.get(*h).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |values: Vec<String>| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| pad(v, *w))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        writeln!(self.out, "{}", line(headers.iter().map(|h| h.to_string()).collect()))?;
        writeln!(
            self.out,
            "{}",
            widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
        )?;
        for row in cells {
            writeln!(self.out, "{}", line(row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CellValue;
    use crate::error::Error;

    fn render(f: impl FnOnce(&mut TextRenderer<Vec<u8>>) -> Result<()>) -> String {
        let mut renderer = TextRenderer::new(Vec::new()).with_width(10);
        f(&mut renderer).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn bar_chart_scales_to_max() {
        let labels = vec!["Mindset".to_string(), "1984".to_string()];
        let out = render(|r| r.render_bar_chart(&labels, &[10.0, 5.0], "Top"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "== Top ==");
        assert_eq!(lines[2], format!("Mindset | {} 10", "█".repeat(10)));
        assert_eq!(lines[3], format!("1984    | {} 5", "█".repeat(5)));
    }

    #[test]
    fn line_chart_marks_each_point() {
        let labels = vec!["01".to_string(), "02".to_string()];
        let out = render(|r| r.render_line_chart(&labels, &[1.5, 3.0], "Revenue"));
        assert!(out.contains("01 | •"));
        assert!(out.contains(&format!("02 | {}• 3", "·".repeat(9))));
    }

    #[test]
    fn table_aligns_columns() {
        let rows: Vec<QueryRow> = vec![
            [("customer".to_string(), CellValue::Text("Ana".into())), ("total".to_string(), CellValue::Real(5100.5))]
                .into_iter()
                .collect(),
            [("customer".to_string(), CellValue::Text("Bartholomew".into())), ("total".to_string(), CellValue::Real(12.0))]
                .into_iter()
                .collect(),
        ];
        let out = render(|r| r.render_table(&rows));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "customer    | total ");
        assert_eq!(lines[1], "------------+-------");
        assert_eq!(lines[2], "Ana         | 5100.5");
        assert_eq!(lines[3], "Bartholomew | 12    ");
    }

    #[test]
    fn mismatched_series_is_an_error() {
        let mut renderer = TextRenderer::new(Vec::new());
        let err = renderer
            .render_line_chart(&["a".to_string()], &[], "x")
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
