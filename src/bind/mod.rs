//! Attribute Binding Engine - Keep element attributes in sync with data.
//!
//! Elements whose only attribute is a manager marker, `{...name}`, are bound
//! to the nested manager `name` of a [`DataObject`]:
//!
//! ```text
//! <button {...submit}>   +   data { submit: { class: "btn", onclick: f } }
//!         │
//!         ▼
//! <button class="btn">  (onclick installed, every field now reactive)
//! ```
//!
//! After binding, every field present at bind time dispatches through a
//! [`FieldAccessor`]: writes sync the element and notify the manager's
//! observer, reads return the shadow value (or the live property for
//! special fields).

mod accessor;
mod classify;
mod engine;
mod manager;

pub use accessor::*;
pub use classify::*;
pub use engine::*;
pub use manager::*;
