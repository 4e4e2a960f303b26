//! Core library for clinical lab report processing.
//!
//! This crate provides:
//! - PDF text extraction (text-based documents only, no OCR)
//! - Tiered lab field extraction (strict unit-anchored patterns, loose fallback)
//! - Reference-range parsing for the AST upper limit of normal
//! - Unit normalization and physiological clamping of numeric values
//! - Table (CSV row) normalization onto the same field keys

pub mod error;
pub mod labs;
pub mod models;
pub mod pdf;

pub use error::{LabscanError, PdfError, Result};
pub use labs::{ExtractionResult, LabParser, LabReportParser, TableMapper};
pub use models::lab::{ClampRule, ExtractedField, FieldKey, LabValue, MatchTier, ValueKind};
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
