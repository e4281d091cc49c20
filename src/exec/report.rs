//! # Reporte de ejecución
//! src/exec/report.rs
//!
//! Fragmentos HTML de la respuesta y el reporte de recursos (tabla + datos
//! del gráfico) que se inserta entre ellos:
//!
//! ```text
//! HTML_START                       primer chunk
//! ...salida del comando...         un chunk por línea
//! HTML_MID1 filas HTML_MID2 json HTML_END   último chunk con datos
//! ```

use super::sampler::ResourceSample;
use serde::Serialize;
use std::fmt::Write;

pub const HTML_START: &str = concat!(
    "<html>\n",
    "<head>\n",
    "  <meta charset='utf-8'>\n",
    "  <script type='text/javascript' src='https://www.gstatic.com/charts/loader.js'></script>\n",
    "  <script type='text/javascript' src='/draw_chart.js'></script>\n",
    "</head>\n",
    "<body>\n",
    "  <h3>Output from program</h3>\n",
    "  <textarea style='width: 700px; height: 200px'>\n",
);

pub const HTML_MID1: &str = concat!(
    "  </textarea>\n",
    "  <h2>Runtime statistics</h2>\n",
    "  <table>\n",
    "    <tr><th>Time (sec)</th><th>User time</th><th>System time</th><th>Memory (MB)</th></tr>\n",
);

pub const HTML_MID2: &str = concat!(
    "  </table>\n",
    "  <div id='chart' style='width: 900px; height: 500px'></div>\n",
    "</body>\n",
    "<script type='text/javascript'>\n",
    "  function getChartData() {\n",
    "    return google.visualization.arrayToDataTable(\n",
    "      [\n",
    "        ['Time (sec)', 'CPU Usage', 'Memory Usage']",
);

pub const HTML_END: &str = "\n      ]\n    );\n  }\n</script>\n</html>\n";

/// Punto del gráfico: se serializa como `[índice, cpu, memoria]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint(pub u32, pub u64, pub u64);

impl From<&ResourceSample> for ChartPoint {
    fn from(sample: &ResourceSample) -> Self {
        ChartPoint(sample.index, sample.cpu_secs(), sample.memory_mb)
    }
}

/// Filas de la tabla y entradas del gráfico, una por muestra
#[derive(Debug, Default, Clone)]
pub struct ExecutionReport {
    rows: String,
    chart: String,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: &[ResourceSample]) -> Self {
        let mut report = Self::new();
        for sample in samples {
            report.push(sample);
        }
        report
    }

    pub fn push(&mut self, sample: &ResourceSample) {
        // write! sobre un String no falla
        let _ = writeln!(
            self.rows,
            "       <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            sample.index, sample.user_secs, sample.system_secs, sample.memory_mb
        );

        let point = serde_json::to_string(&ChartPoint::from(sample)).unwrap_or_default();
        let _ = write!(self.chart, ",\n          {}", point);
    }

    pub fn rows(&self) -> &str {
        &self.rows
    }

    /// Entradas del gráfico; `""` si el gráfico está desactivado
    pub fn chart_data(&self, chart: bool) -> &str {
        if chart {
            &self.chart
        } else {
            ""
        }
    }

    /// Payload del último chunk con datos
    pub fn render(&self, chart: bool) -> String {
        let chart_data = self.chart_data(chart);
        let mut html = String::with_capacity(
            HTML_MID1.len() + self.rows.len() + HTML_MID2.len() + chart_data.len() + HTML_END.len(),
        );
        html.push_str(HTML_MID1);
        html.push_str(&self.rows);
        html.push_str(HTML_MID2);
        html.push_str(chart_data);
        html.push_str(HTML_END);
        html
    }
}
