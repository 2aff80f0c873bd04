//! Core value types shared by the taxonomy, collection and manifest stages.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Label and image identifiers are both plain strings in
//!    OpenImages; newtypes keep them from being swapped.
//!
//! 2. **Source Fidelity**: Boxes keep the normalized `xmin, xmax, ymin, ymax`
//!    order of the OpenImages tables rather than converting on the way in.
//!
//! # Example
//!
//! ```
//! use oisample::ir::{ImageId, LabelId, LabeledBox};
//!
//! let image = ImageId::from("000002b66c9c498e");
//! let label = LabelId::from("/m/0jbk");
//! let cat = LabeledBox::new("Cat", 0.1, 0.6, 0.2, 0.9);
//! assert_eq!(label.as_str(), "/m/0jbk");
//! assert_eq!(image.to_string(), "000002b66c9c498e");
//! assert!((cat.width() - 0.5).abs() < 1e-12);
//! ```

mod bbox;
mod ids;

pub use bbox::LabeledBox;
pub use ids::{ImageId, LabelId};
