//! Class-tagged bounding boxes in OpenImages coordinate order.

use serde::{Deserialize, Serialize};

/// A bounding box tagged with the requested class name it was collected for.
///
/// Coordinates are normalized to the image size (0.0 to 1.0) exactly as they
/// appear in the OpenImages box tables. The field order follows those tables:
/// `xmin, xmax, ymin, ymax`, not the more common XYXY order.
///
/// Malformed boxes (min > max, values outside the unit square) are carried
/// through unchanged; the upstream table is trusted.
#[derive(Clone, PartialEq)]
pub struct LabeledBox {
    pub class_name: String,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl LabeledBox {
    /// Creates a new box from explicit coordinates.
    #[inline]
    pub fn new(class_name: impl Into<String>, xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            class_name: class_name.into(),
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Returns the width of the box as a fraction of the image width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Returns the height of the box as a fraction of the image height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

impl std::fmt::Debug for LabeledBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LabeledBox")
            .field(&self.class_name)
            .field(&self.xmin)
            .field(&self.xmax)
            .field(&self.ymin)
            .field(&self.ymax)
            .finish()
    }
}

// Serialized as a positional array: ["Cat", xmin, xmax, ymin, ymax]
impl Serialize for LabeledBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeTuple;
        let mut state = serializer.serialize_tuple(5)?;
        state.serialize_element(&self.class_name)?;
        state.serialize_element(&self.xmin)?;
        state.serialize_element(&self.xmax)?;
        state.serialize_element(&self.ymin)?;
        state.serialize_element(&self.ymax)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for LabeledBox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (class_name, xmin, xmax, ymin, ymax) =
            <(String, f64, f64, f64, f64)>::deserialize(deserializer)?;
        Ok(LabeledBox {
            class_name,
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }
}
