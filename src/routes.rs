//! Merge of `routes/web.php` after `breeze:install` overwrites it.
//!
//! The merged file has three sections:
//! 1. header: the pre-install file, kept verbatim, plus any `use` imports the Breeze file
//!    needs that the header lacks (inserted after the last existing import);
//! 2. the [`BREEZE_MARKER`] line;
//! 3. the Breeze file body without its `<?php` tag and without import lines.
//!
//! A file that already carries the marker is returned unchanged.

use crate::errors::{LaraboxError, Result};

pub const BREEZE_MARKER: &str = "// --- breeze routes ---";
const PHP_OPEN_TAG: &str = "<?php";

fn is_import(line: &str) -> bool {
    let t = line.trim();
    t.starts_with("use ") && t.ends_with(';')
}

fn is_open_tag(line: &str) -> bool {
    line.trim_start().starts_with(PHP_OPEN_TAG)
}

pub fn merge_web_routes(original: &str, generated: &str) -> Result<String> {
    if original.lines().any(|l| l.trim() == BREEZE_MARKER) {
        return Ok(original.to_string());
    }

    let mut header: Vec<String> = original.trim_end().lines().map(str::to_string).collect();
    let open_idx = header
        .iter()
        .position(|l| !l.trim().is_empty())
        .filter(|&i| is_open_tag(&header[i]))
        .ok_or_else(|| LaraboxError::RouteMerge("routes file does not start with <?php".into()))?;

    let known: Vec<String> = header
        .iter()
        .filter(|l| is_import(l))
        .map(|l| l.trim().to_string())
        .collect();

    let mut new_imports: Vec<String> = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut seen_open_tag = false;
    for line in generated.lines() {
        if !seen_open_tag && is_open_tag(line) {
            seen_open_tag = true;
            continue;
        }
        if is_import(line) {
            let t = line.trim().to_string();
            if !known.contains(&t) && !new_imports.contains(&t) {
                new_imports.push(t);
            }
            continue;
        }
        body.push(line);
    }
    while body.first().is_some_and(|l| l.trim().is_empty()) {
        body.remove(0);
    }
    while body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }

    if !new_imports.is_empty() {
        match header.iter().rposition(|l| is_import(l)) {
            Some(last) => {
                let at = last + 1;
                header.splice(at..at, new_imports);
            }
            None => {
                let at = open_idx + 1;
                let mut block = vec![String::new()];
                block.extend(new_imports);
                header.splice(at..at, block);
            }
        }
    }

    let mut out = header.join("\n");
    out.push_str("\n\n");
    out.push_str(BREEZE_MARKER);
    out.push('\n');
    if !body.is_empty() {
        out.push_str(&body.join("\n"));
        out.push('\n');
    }
    Ok(out)
}
