//! Page state shared by the page controller and whatever renders it.

pub mod page;
