//! Specifier scanning
//!
//! Extracts bare module specifiers from source text with a best-effort
//! token scan. The scanner is not a parser: it tolerates arbitrarily
//! malformed input and simply returns an empty set when nothing matches.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// `import ... from '<specifier>'` and `export ... from '<specifier>'`
static IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:import|export)\s[^'"]*?from\s*['"]([^'"]+)['"]"#).unwrap()
});

/// Side-effect imports: `import '<specifier>'`
static IMPORT_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"import\s*['"]([^'"]+)['"]"#).unwrap());

/// `require('<specifier>')` and dynamic `import('<specifier>')`
static CALL_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
});

/// Scan source text for bare module specifiers.
///
/// Matches import-like syntax that references a module by a quoted string
/// literal and excludes relative (`./`, `../`) and absolute (`/`) paths,
/// which are not externally resolvable. Specifiers are deduplicated within
/// one call; deduplication across calls is the caller's concern.
pub fn scan_specifiers(text: &str) -> HashSet<String> {
    let mut specifiers = HashSet::new();

    for pattern in [&*IMPORT_FROM, &*IMPORT_BARE, &*CALL_FORM] {
        for captures in pattern.captures_iter(text) {
            let specifier = &captures[1];
            if is_bare_specifier(specifier) {
                specifiers.insert(specifier.to_string());
            }
        }
    }

    specifiers
}

/// Whether a specifier refers to an external module rather than a file path.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty()
        && !specifier.starts_with("./")
        && !specifier.starts_with("../")
        && !specifier.starts_with('/')
}

/// Split a specifier into its module name and optional version suffix.
///
/// Supports the `name@version` input convention (`lodash@4.17.21`).
/// Scoped names keep their leading `@`: `@org/pkg@1.2.0` splits into
/// `("@org/pkg", Some("1.2.0"))`.
pub fn split_name_version(specifier: &str) -> (&str, Option<&str>) {
    // Skip the scope marker so `@org/pkg` is not split at position 0.
    let search_start = if specifier.starts_with('@') { 1 } else { 0 };

    match specifier[search_start..].find('@') {
        Some(idx) => {
            let at = search_start + idx;
            let version = &specifier[at + 1..];
            if version.is_empty() {
                (&specifier[..at], None)
            } else {
                (&specifier[..at], Some(version))
            }
        }
        None => (specifier, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_import_from() {
        let specs = scan_specifiers("import { debounce } from 'lodash';");
        assert_eq!(specs, HashSet::from(["lodash".to_string()]));
    }

    #[test]
    fn test_scan_excludes_relative_and_absolute() {
        let specs =
            scan_specifiers("import {x} from 'left-pad'; import y from './local'");
        assert_eq!(specs, HashSet::from(["left-pad".to_string()]));

        let specs = scan_specifiers(
            "import a from '../up'; import b from '/abs'; import c from 'axios'",
        );
        assert_eq!(specs, HashSet::from(["axios".to_string()]));
    }

    #[test]
    fn test_scan_export_from() {
        let specs = scan_specifiers("export { default as moment } from 'moment';");
        assert_eq!(specs, HashSet::from(["moment".to_string()]));
    }

    #[test]
    fn test_scan_side_effect_import() {
        let specs = scan_specifiers("import 'core-js';");
        assert_eq!(specs, HashSet::from(["core-js".to_string()]));
    }

    #[test]
    fn test_scan_require_and_dynamic_import() {
        let specs = scan_specifiers(
            "const _ = require('lodash'); const m = await import('moment');",
        );
        assert_eq!(
            specs,
            HashSet::from(["lodash".to_string(), "moment".to_string()])
        );
    }

    #[test]
    fn test_scan_subpath_specifier() {
        let specs = scan_specifiers("import { createRoot } from 'react-dom/client';");
        assert_eq!(specs, HashSet::from(["react-dom/client".to_string()]));
    }

    #[test]
    fn test_scan_deduplicates_within_call() {
        let specs = scan_specifiers(
            "import a from 'lodash'; import b from 'lodash'; const c = require('lodash');",
        );
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn test_scan_malformed_source() {
        assert!(scan_specifiers("import from from import '").is_empty());
        assert!(scan_specifiers("").is_empty());
        assert!(scan_specifiers("const x = 1; /* no imports */").is_empty());
    }

    #[test]
    fn test_split_name_version() {
        assert_eq!(split_name_version("lodash"), ("lodash", None));
        assert_eq!(
            split_name_version("lodash@4.17.21"),
            ("lodash", Some("4.17.21"))
        );
        assert_eq!(split_name_version("lodash@latest"), ("lodash", Some("latest")));
        assert_eq!(split_name_version("lodash@"), ("lodash", None));
    }

    #[test]
    fn test_split_scoped_name() {
        assert_eq!(split_name_version("@org/pkg"), ("@org/pkg", None));
        assert_eq!(
            split_name_version("@org/pkg@1.2.0"),
            ("@org/pkg", Some("1.2.0"))
        );
    }
}
