//! Shared "report pipeline" logic used by both the text and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> aggregate -> derive -> artifacts
//!
//! The front-ends then only implement `ArtifactSink` (printing vs widgets).

use std::io::Write;

use crate::domain::ReportConfig;
use crate::error::AppError;
use crate::io::ingest::IngestedData;
use crate::report::{Artifact, Report, ReportItem};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub report: Report,
}

/// Whether the viewer wants the next artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Something that displays report artifacts one at a time.
///
/// `show` returns only once the artifact has been displayed (for the TUI: once
/// the user moves on), so artifacts are presented strictly in order.
pub trait ArtifactSink {
    fn show(&mut self, artifact: &Artifact) -> Result<Flow, AppError>;

    /// Emit a diagnostic that replaces a skipped artifact.
    fn notice(&mut self, message: &str) -> Result<(), AppError>;
}

/// Load the CSV and compute every artifact.
pub fn run_report(config: &ReportConfig) -> Result<RunOutput, AppError> {
    let ingest = crate::io::ingest::load_sales(&config.input)?;
    let report = crate::report::build_report(&ingest.dataset, config.average_window);
    Ok(RunOutput { ingest, report })
}

/// Hand each report item to `sink` in order. Returns the number of artifacts shown.
pub fn present(report: &Report, sink: &mut dyn ArtifactSink) -> Result<usize, AppError> {
    let mut shown = 0usize;
    for item in &report.items {
        match item {
            ReportItem::Artifact(artifact) => {
                tracing::info!(title = artifact.title(), "showing artifact");
                let flow = sink.show(artifact)?;
                shown += 1;
                if flow == Flow::Quit {
                    tracing::info!(shown, "viewer closed before the last artifact");
                    break;
                }
            }
            ReportItem::Notice(message) => sink.notice(message)?,
        }
    }
    Ok(shown)
}

/// Prints artifacts as plain text.
pub struct TextPrinter<W: Write> {
    out: W,
    width: usize,
    height: usize,
}

impl<W: Write> TextPrinter<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self { out, width, height }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) -> Result<(), AppError> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| AppError::Terminal(format!("Failed to write output: {e}")))
    }
}

impl<W: Write> ArtifactSink for TextPrinter<W> {
    fn show(&mut self, artifact: &Artifact) -> Result<Flow, AppError> {
        let text = crate::plot::render_artifact(artifact, self.width, self.height);
        self.write(&text)?;
        self.write("\n")?;
        Ok(Flow::Continue)
    }

    fn notice(&mut self, message: &str) -> Result<(), AppError> {
        self.write(message)?;
        self.write("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::domain::{AverageWindow, OutputMode};
    use crate::report::MISSING_PRICE_NOTICE;

    /// Records what would have been displayed.
    #[derive(Default)]
    struct Collector {
        titles: Vec<&'static str>,
        notices: Vec<String>,
        quit_after: Option<usize>,
    }

    impl ArtifactSink for Collector {
        fn show(&mut self, artifact: &Artifact) -> Result<Flow, AppError> {
            self.titles.push(artifact.title());
            if self.quit_after == Some(self.titles.len()) {
                return Ok(Flow::Quit);
            }
            Ok(Flow::Continue)
        }

        fn notice(&mut self, message: &str) -> Result<(), AppError> {
            self.notices.push(message.to_string());
            Ok(())
        }
    }

    /// Shared sink for formatted log lines.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn config_for(csv: &str) -> (tempfile::NamedTempFile, ReportConfig) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();
        let config = ReportConfig {
            input: file.path().to_path_buf(),
            output: OutputMode::Text,
            average_window: AverageWindow::Fixed,
            export_json: None,
        };
        (file, config)
    }

    #[test]
    fn merges_product_variants_across_the_pipeline() {
        let (_file, config) = config_for(
            "producto,mes,cantidad,precio_unitario\n\
             camisa,Enero,5,10\n\
             \" Camisa \",Febrero,7,10\n\
             CAMISA,Marzo,3,10\n\
             zapato,Marzo,2,50\n",
        );
        let run = run_report(&config).unwrap();
        let totals = &run.report.summary.units_by_product;
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Camisa"], 15);
        assert_eq!(totals["Zapato"], 2);

        let by_month: u64 = run.report.summary.units_by_month.iter().map(|m| m.units).sum();
        assert_eq!(by_month, totals.values().sum::<u64>());
    }

    #[test]
    fn missing_price_shows_three_artifacts_and_one_notice() {
        let (_file, config) = config_for("producto,mes,cantidad\nCamisa,Junio,4\nZapato,Enero,1\n");
        let run = run_report(&config).unwrap();

        let mut sink = Collector::default();
        let shown = present(&run.report, &mut sink).unwrap();
        assert_eq!(shown, 3);
        assert_eq!(sink.notices, vec![MISSING_PRICE_NOTICE.to_string()]);
        assert_eq!(
            sink.titles,
            vec!["Ventas por Producto", "Ventas por Mes y Producto", "Resumen de Ventas"]
        );
    }

    #[test]
    fn quitting_stops_remaining_artifacts() {
        let (_file, config) = config_for("producto,mes,cantidad,precio_unitario\nCamisa,Enero,4,1.5\n");
        let run = run_report(&config).unwrap();

        let mut sink = Collector {
            quit_after: Some(1),
            ..Collector::default()
        };
        assert_eq!(present(&run.report, &mut sink).unwrap(), 1);
        assert_eq!(sink.titles, vec!["Ventas por Producto"]);
    }

    #[test]
    fn text_printer_writes_notice_between_artifacts() {
        let (_file, config) = config_for("producto,mes,cantidad\nCamisa,Marzo,30\nCamisa,Enero,10\n");
        let run = run_report(&config).unwrap();

        let mut printer = TextPrinter::new(Vec::new(), 60, 8);
        present(&run.report, &mut printer).unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();

        assert_eq!(text.matches(MISSING_PRICE_NOTICE).count(), 1);
        let trend = text.find("Ventas por Mes y Producto").unwrap();
        let notice = text.find(MISSING_PRICE_NOTICE).unwrap();
        let summary = text.find("Resumen de Ventas").unwrap();
        assert!(trend < notice && notice < summary);
    }

    #[test]
    fn missing_price_notice_is_the_only_diagnostic_at_default_level() {
        let (_file, config) = config_for("producto,mes,cantidad\nCamisa,Marzo,30\nZapato,Enero,2\n");
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let text = tracing::subscriber::with_default(subscriber, || {
            let run = run_report(&config).unwrap();
            let mut printer = TextPrinter::new(Vec::new(), 60, 8);
            present(&run.report, &mut printer).unwrap();
            String::from_utf8(printer.into_inner()).unwrap()
        });

        assert_eq!(text.matches(MISSING_PRICE_NOTICE).count(), 1);
        let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(!logs.contains("precio_unitario"), "unexpected diagnostics: {logs}");
        assert!(logs.is_empty(), "unexpected diagnostics: {logs}");
    }

    #[test]
    fn missing_required_column_fails_before_rendering() {
        let (_file, config) = config_for("producto,cantidad\nCamisa,3\n");
        let err = run_report(&config).unwrap_err();
        assert!(matches!(err, AppError::DataFormat(_)));
    }
}
