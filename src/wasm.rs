//! WASM bindings for schematic-converter.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use crate::config::ConverterConfig;
use crate::converter::Converter;
use crate::export::ModelFormat;
use crate::registry::BlockTable;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Converter options.
#[wasm_bindgen]
pub struct ConverterOptions {
    view_distance: Option<u32>,
    canvas_width: u32,
    canvas_height: u32,
    cull_hidden_faces: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        // The in-page preview canvas
        ConverterOptions {
            view_distance: None,
            canvas_width: 640,
            canvas_height: 480,
            cull_hidden_faces: true,
        }
    }
}

#[wasm_bindgen]
impl ConverterOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ConverterOptions {
        ConverterOptions::default()
    }

    #[wasm_bindgen(setter)]
    pub fn set_view_distance(&mut self, value: u32) {
        self.view_distance = Some(value);
    }

    #[wasm_bindgen(setter)]
    pub fn set_canvas_width(&mut self, value: u32) {
        self.canvas_width = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_canvas_height(&mut self, value: u32) {
        self.canvas_height = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_cull_hidden_faces(&mut self, value: bool) {
        self.cull_hidden_faces = value;
    }
}

/// Converts structure files in the page.
#[wasm_bindgen]
pub struct SchematicConverter {
    inner: Converter,
}

#[wasm_bindgen]
impl SchematicConverter {
    /// Create a converter.
    ///
    /// `registry_json` is a minecraft-data style `blocks.json` array. Without
    /// it every block maps to the unknown id.
    #[wasm_bindgen(constructor)]
    pub fn new(
        registry_json: Option<String>,
        options: Option<ConverterOptions>,
    ) -> Result<SchematicConverter, JsError> {
        let registry = match registry_json {
            Some(json) => BlockTable::from_json(&json).map_err(|e| JsError::new(&e.to_string()))?,
            None => BlockTable::default(),
        };

        let options = options.unwrap_or_default();
        let config = ConverterConfig {
            view_distance: options.view_distance,
            canvas_width: options.canvas_width,
            canvas_height: options.canvas_height,
            cull_hidden_faces: options.cull_hidden_faces,
            ..ConverterConfig::default()
        };

        Ok(SchematicConverter {
            inner: Converter::new(Arc::new(registry), config),
        })
    }

    /// Convert a structure file's bytes into a glTF document.
    pub fn convert(&self, data: &[u8]) -> Result<ConversionResult, JsError> {
        let conversion = self
            .inner
            .convert(data, ModelFormat::Gltf)
            .map_err(|e| JsError::new(&e.to_string()))?;

        let gltf = String::from_utf8(conversion.bytes).map_err(|e| JsError::new(&e.to_string()))?;

        Ok(ConversionResult {
            gltf,
            block_count: conversion.block_count,
            unknown_block_count: conversion.report.unknown_block_count(),
        })
    }

    /// Convert a structure file's bytes into binary glTF.
    pub fn convert_glb(&self, data: &[u8]) -> Result<js_sys::Uint8Array, JsError> {
        let conversion = self
            .inner
            .convert(data, ModelFormat::Glb)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(js_sys::Uint8Array::from(conversion.bytes.as_slice()))
    }
}

/// Conversion result containing the glTF document.
#[wasm_bindgen]
pub struct ConversionResult {
    gltf: String,
    block_count: usize,
    unknown_block_count: usize,
}

#[wasm_bindgen]
impl ConversionResult {
    /// Get the glTF JSON document.
    #[wasm_bindgen(getter)]
    pub fn gltf(&self) -> String {
        self.gltf.clone()
    }

    /// Get the number of placed blocks.
    #[wasm_bindgen(getter)]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Get the number of blocks whose type was not in the registry.
    #[wasm_bindgen(getter)]
    pub fn unknown_block_count(&self) -> usize {
        self.unknown_block_count
    }
}
