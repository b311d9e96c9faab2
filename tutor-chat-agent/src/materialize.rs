//! Turns a [`PlotSpec`] into a renderer-ready copy with decoded axes.

use crate::decode::decode;
use crate::visualization::{AxisData, PlotSpec};

/// Return a copy of `spec` with every encoded `x`/`y`/`z` axis decoded.
///
/// The input is never modified. An axis whose payload fails to decode keeps
/// its encoded form; absent and plain axes pass through untouched.
pub fn materialize(spec: &PlotSpec) -> PlotSpec {
    let mut copy = spec.clone();
    for series in &mut copy.series {
        for axis in series.axes_mut() {
            if let Some(AxisData::Encoded(encoded)) = axis
                && let Ok(values) = decode(&encoded.bdata, &encoded.dtype)
            {
                *axis = Some(AxisData::Decoded(values));
            }
        }
    }
    copy
}
