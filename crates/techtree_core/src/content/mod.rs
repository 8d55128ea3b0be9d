//! Built-in mod content declared in code.
//!
//! Each submodule exposes the descriptors for one object and a `register`
//! function that files them into a [`crate::lifecycle::RegistryBuilder`].

pub mod steam_front_loader;
