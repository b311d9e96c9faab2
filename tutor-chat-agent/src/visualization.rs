//! Typed visualization records extracted from tool responses.

use serde_json::{Map, Value};

/// Default title for a plot record whose response carries none.
pub const DEFAULT_PLOT_TITLE: &str = "Untitled Plot";

/// Default title for a circuit record whose response carries none.
pub const DEFAULT_CIRCUIT_TITLE: &str = "Circuit Visualization";

/// A binary-encoded typed array (`{"bdata": "...", "dtype": "f8"}`).
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedArray {
    /// Base64 payload.
    pub bdata: String,
    /// Element type tag, kept verbatim so unsupported tags survive until decode.
    pub dtype: String,
}

/// The value of one trace axis (`x`, `y` or `z`).
#[derive(Debug, Clone, PartialEq)]
pub enum AxisData {
    /// Values as sent by the agent (numbers, strings, nested arrays).
    Plain(Value),
    /// A typed array awaiting decode.
    Encoded(EncodedArray),
    /// A decoded numeric series.
    Decoded(Vec<f64>),
}

impl AxisData {
    /// Classify a raw axis value.
    ///
    /// An object with non-empty string `bdata` and `dtype` fields is
    /// [`AxisData::Encoded`]; anything else is kept as [`AxisData::Plain`].
    pub fn from_value(value: &Value) -> Self {
        let bdata = value.get("bdata").and_then(|v| v.as_str());
        let dtype = value.get("dtype").and_then(|v| v.as_str());
        match (bdata, dtype) {
            (Some(bdata), Some(dtype)) if !bdata.is_empty() && !dtype.is_empty() => {
                Self::Encoded(EncodedArray {
                    bdata: bdata.to_string(),
                    dtype: dtype.to_string(),
                })
            }
            _ => Self::Plain(value.clone()),
        }
    }

    /// Number of points, when known without decoding.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Plain(Value::Array(values)) => Some(values.len()),
            Self::Plain(_) | Self::Encoded(_) => None,
            Self::Decoded(values) => Some(values.len()),
        }
    }

    /// Whether the axis is known to hold no points.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Convert back to the Plotly JSON representation.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Encoded(encoded) => serde_json::json!({
                "bdata": encoded.bdata,
                "dtype": encoded.dtype,
            }),
            Self::Decoded(values) => Value::Array(values.iter().map(|v| Value::from(*v)).collect()),
        }
    }
}

/// One trace of a plot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub x: Option<AxisData>,
    pub y: Option<AxisData>,
    pub z: Option<AxisData>,
    /// Every other trace field (`mode`, `name`, `type`, `line`, ...).
    pub attributes: Map<String, Value>,
}

impl Series {
    /// Build a series from a Plotly trace object.
    pub fn from_map(trace: &Map<String, Value>) -> Self {
        let mut series = Series::default();
        for (key, value) in trace {
            match key.as_str() {
                "x" => series.x = Some(AxisData::from_value(value)),
                "y" => series.y = Some(AxisData::from_value(value)),
                "z" => series.z = Some(AxisData::from_value(value)),
                _ => {
                    series.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        series
    }

    /// Mutable access to the three axes, for in-place transforms.
    pub fn axes_mut(&mut self) -> [&mut Option<AxisData>; 3] {
        [&mut self.x, &mut self.y, &mut self.z]
    }

    /// The trace's `name`, if any.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|v| v.as_str())
    }

    /// The trace's `mode` (`lines`, `markers`, ...), if any.
    pub fn mode(&self) -> Option<&str> {
        self.attributes.get("mode").and_then(|v| v.as_str())
    }

    /// Number of points, taken from `x` then `y`.
    pub fn point_count(&self) -> Option<usize> {
        self.x
            .as_ref()
            .and_then(AxisData::len)
            .or_else(|| self.y.as_ref().and_then(AxisData::len))
    }

    /// Convert back to a Plotly trace object.
    pub fn to_value(&self) -> Value {
        let mut trace = self.attributes.clone();
        for (key, axis) in [("x", &self.x), ("y", &self.y), ("z", &self.z)] {
            if let Some(axis) = axis {
                trace.insert(key.to_string(), axis.to_value());
            }
        }
        Value::Object(trace)
    }
}

/// A renderable Plotly figure: traces plus layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotSpec {
    pub series: Vec<Series>,
    pub layout: Map<String, Value>,
}

impl PlotSpec {
    /// Build a spec from a `plot_data` object.
    ///
    /// Returns `None` unless `data` is an array and `layout` an object.
    /// Non-object entries in `data` are skipped.
    pub fn from_value(plot_data: &Value) -> Option<Self> {
        let data = plot_data.get("data")?.as_array()?;
        let layout = plot_data.get("layout")?.as_object()?.clone();
        let series = data
            .iter()
            .filter_map(|trace| match trace.as_object() {
                Some(map) => Some(Series::from_map(map)),
                None => {
                    log::debug!("Skipping non-object plot trace: {trace}");
                    None
                }
            })
            .collect();
        Some(Self { series, layout })
    }

    /// Serialize as a Plotly figure (`{"data": [...], "layout": {...}}`).
    pub fn to_plotly_json(&self) -> Value {
        serde_json::json!({
            "data": self.series.iter().map(Series::to_value).collect::<Vec<_>>(),
            "layout": Value::Object(self.layout.clone()),
        })
    }
}

/// The result of one `plotting_tool` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRecord {
    pub success: bool,
    pub plot_spec: Option<PlotSpec>,
    pub equations: Vec<String>,
    pub x_range: Option<[f64; 2]>,
    pub title: String,
    pub error: Option<String>,
    pub detail: Option<String>,
}

/// The result of one successful `circuit_visualization_tool` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitRecord {
    pub success: bool,
    /// Base64-encoded SVG markup.
    pub image_data: String,
    pub title: String,
}

impl CircuitRecord {
    /// Decode the embedded SVG markup.
    pub fn decode_svg(&self) -> Result<String, crate::decode::DecodeError> {
        crate::decode::decode_text(&self.image_data)
    }
}

/// Everything extracted from one agent response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visualizations {
    pub plots: Vec<PlotRecord>,
    pub circuits: Vec<CircuitRecord>,
}

impl Visualizations {
    /// Whether no plot or circuit record was extracted.
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty() && self.circuits.is_empty()
    }
}
