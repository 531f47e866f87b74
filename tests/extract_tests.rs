//! Structural extraction over realistic module text

use codedna::ingest::extract;
use codedna::ParsedImport;

const SERVICE_MODULE: &str = r#"
import React, { useState, useEffect as useMountEffect } from 'react';
import type { Config } from './config';
import * as api from "../api/client";
import './styles.css';
const { readFile } = require('fs');
const helpers = require('./helpers');

// import { Legacy } from './legacy';
/* export const hidden = 1; */

export { formatDate, parseDate as parse } from './dates';
export * from './shared';

export const DEFAULT_TIMEOUT = 30_000;

export abstract class BaseService {
  abstract run(): Promise<void>;
}

async function loadPlugins() {
  const mod = await import('./plugins/index');
  return mod;
}

export default function createService(config: Config) {
  return new Service(config);
}

class Service extends BaseService {
  async run() {}
}
"#;

fn import<'a>(imports: &'a [ParsedImport], spec: &str) -> &'a ParsedImport {
    imports
        .iter()
        .find(|i| i.specifier == spec)
        .unwrap_or_else(|| panic!("missing import {}", spec))
}

#[test]
fn test_service_module_imports() {
    let parsed = extract(SERVICE_MODULE);
    let specs: Vec<&str> = parsed.imports.iter().map(|i| i.specifier.as_str()).collect();
    assert_eq!(
        specs,
        vec![
            "react",
            "./config",
            "../api/client",
            "./styles.css",
            "fs",
            "./helpers",
            "./dates",
            "./shared",
            "./plugins/index",
        ]
    );

    let react = import(&parsed.imports, "react");
    assert!(!react.is_relative);
    assert_eq!(react.imported_names, vec!["React", "useState", "useEffect"]);

    assert_eq!(import(&parsed.imports, "../api/client").imported_names, vec!["api"]);
    assert_eq!(import(&parsed.imports, "fs").imported_names, vec!["readFile"]);
    assert_eq!(import(&parsed.imports, "./helpers").imported_names, vec!["helpers"]);
    assert_eq!(
        import(&parsed.imports, "./dates").imported_names,
        vec!["formatDate", "parseDate"]
    );

    let plugins = import(&parsed.imports, "./plugins/index");
    assert!(plugins.is_dynamic);
    assert!(plugins.is_relative);
    assert!(parsed.imports.iter().all(|i| i.specifier != "./legacy"));
}

#[test]
fn test_service_module_exports_and_definitions() {
    let parsed = extract(SERVICE_MODULE);
    assert_eq!(
        parsed.exports,
        vec![
            "formatDate",
            "parse",
            "*",
            "DEFAULT_TIMEOUT",
            "BaseService",
            "createService",
        ]
    );
    assert!(!parsed.exports.contains(&"hidden".to_string()));
    assert_eq!(
        parsed.definitions,
        vec!["BaseService", "loadPlugins", "createService", "Service"]
    );
}

#[test]
fn test_reexport_only_file_is_import_and_export() {
    let parsed = extract("export { Button } from './button';\n");
    assert_eq!(parsed.exports, vec!["Button"]);
    assert_eq!(parsed.imports.len(), 1);
    assert_eq!(parsed.imports[0].specifier, "./button");
    assert!(!parsed.imports[0].is_dynamic);
}

#[test]
fn test_extraction_is_deterministic() {
    let first = extract(SERVICE_MODULE);
    for _ in 0..3 {
        assert_eq!(extract(SERVICE_MODULE), first);
    }
}

#[test]
fn test_degenerate_inputs_do_not_fail() {
    assert_eq!(extract(""), Default::default());
    assert_eq!(extract("   \n\t"), Default::default());
    assert_eq!(extract("// only a comment\n/* and a block */"), Default::default());

    let broken = extract("import { a, b from './x\nexport const = ;\nclass {");
    assert!(broken.exports.is_empty());
    assert!(broken.definitions.is_empty());

    let unterminated = extract("const s = `template ${ import('./lazy') ");
    assert!(unterminated.definitions.is_empty());
}

#[test]
fn test_bare_specifiers_are_never_relative() {
    let parsed = extract(
        "import fs from 'node:fs';\nimport { x } from '@scope/pkg';\nimport y from '/abs/y';",
    );
    let relative: Vec<bool> = parsed.imports.iter().map(|i| i.is_relative).collect();
    assert_eq!(relative, vec![false, false, true]);
}
