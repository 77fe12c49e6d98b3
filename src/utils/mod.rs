//! # Utility Modules
//!
//! This module contains utility functions, constants, and validators used
//! throughout the service.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Application-wide configuration constants
//! - **File** (`file`) - Upload filter and file helpers
//! - **Secret** (`secret`) - Secret loading from files or environment
//! - **Static objects** (`static_object`) - Lazily read environment settings
//! - **Validators** (`validator`) - Input validation utilities and regex patterns

pub mod constant;
pub mod file;
pub mod secret;
pub mod static_object;
pub mod validator;
