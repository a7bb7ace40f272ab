use anyhow::Context;
use askama::Template;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::GeneratorConfig;
use crate::paths::import_specifier;
use crate::table::{DispatchTable, PipelineKind};

/// One `import <clause> from 'specifier';` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    /// `{ A, B }` for named bindings, a bare name for a default binding.
    pub clause: String,
    /// Quoted module specifier.
    pub specifier: String,
}

impl ImportLine {
    pub fn named(names: &str, specifier: String) -> Self {
        Self {
            clause: format!("{{ {names} }}"),
            specifier,
        }
    }

    pub fn default_binding(name: &str, specifier: String) -> Self {
        Self {
            clause: name.to_string(),
            specifier,
        }
    }
}

/// One route registration in the generated router
#[derive(Debug, Clone)]
pub struct RouteLine {
    /// Router method (`get`, `post`, ...)
    pub method: String,
    /// Quoted route path
    pub path: String,
    pub class_name: String,
    pub handler: String,
}

/// One `case` arm in the generated queue dispatcher
#[derive(Debug, Clone)]
pub struct TaskLine {
    /// Quoted queue name
    pub queue: String,
    pub class_name: String,
    pub method: String,
    pub is_batch: bool,
}

/// Template data for the generated HTTP router
#[derive(Template)]
#[template(path = "router.ts.txt", escape = "none")]
pub struct RouterTemplateData {
    /// Support imports followed by class imports
    pub imports: Vec<ImportLine>,
    pub container_type: String,
    /// Middleware bindings registered before any route
    pub middleware: Vec<String>,
    pub routes: Vec<RouteLine>,
    /// Quoted health-check path
    pub health_path: String,
}

/// Template data for the generated queue dispatcher
#[derive(Template)]
#[template(path = "queue.ts.txt", escape = "none")]
pub struct QueueTemplateData {
    pub imports: Vec<ImportLine>,
    pub container_type: String,
    pub env_type: String,
    pub tasks: Vec<TaskLine>,
}

/// Quote `value` as a single-quoted TypeScript string literal.
///
/// ```
/// use edgeroute::generator::ts_string_literal;
///
/// assert_eq!(ts_string_literal("/users"), "'/users'");
/// assert_eq!(ts_string_literal("it's"), r"'it\'s'");
/// ```
pub fn ts_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Whether `name` can be emitted verbatim as a binding name.
pub fn is_ts_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first == '$' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

fn ensure_identifier(name: &str, what: &str) -> anyhow::Result<()> {
    if is_ts_identifier(name) {
        Ok(())
    } else {
        anyhow::bail!("{what} `{name}` is not a valid identifier")
    }
}

/// Import lines for the classes `kind` references, sorted by class name.
fn class_imports(
    table: &DispatchTable,
    kind: PipelineKind,
    root: &Path,
    output_dir: &Path,
) -> anyhow::Result<Vec<ImportLine>> {
    table
        .referenced_classes(kind)
        .into_iter()
        .map(|name| {
            let class = table
                .imports
                .get(name)
                .with_context(|| format!("No module recorded for class {name}"))?;
            let specifier =
                ts_string_literal(&import_specifier(output_dir, &root.join(&class.module)));
            Ok(if class.default_export {
                ImportLine::default_binding(name, specifier)
            } else {
                ImportLine::named(name, specifier)
            })
        })
        .collect()
}

fn output_dir(root: &Path, output: &Path) -> std::path::PathBuf {
    root.join(output)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf())
}

/// Render the HTTP router module for `table`.
///
/// `root` is the project root the configured paths are relative to.
pub fn render_router(
    table: &DispatchTable,
    config: &GeneratorConfig,
    root: &Path,
) -> anyhow::Result<String> {
    let http = &config.http;
    let out_dir = output_dir(root, &http.output);
    ensure_identifier(&http.container_type, "container type")?;

    let router_names = if table.routes.is_empty() {
        "Router"
    } else {
        "Router, IRequest"
    };
    let mut imports = vec![
        ImportLine::named(router_names, ts_string_literal(&http.router_package)),
        ImportLine::named(&http.container_type, ts_string_literal(&http.container_package)),
    ];
    for mw in &http.middleware {
        ensure_identifier(&mw.name, "middleware")?;
        imports.push(ImportLine::named(
            &mw.name,
            ts_string_literal(&import_specifier(&out_dir, &root.join(&mw.path))),
        ));
    }
    imports.extend(class_imports(table, PipelineKind::Http, root, &out_dir)?);

    let routes = table
        .routes
        .iter()
        .map(|route| RouteLine {
            method: route.method.as_str().to_string(),
            path: ts_string_literal(&route.path),
            class_name: route.controller_name.clone(),
            handler: route.handler_name.clone(),
        })
        .collect();

    let rendered = RouterTemplateData {
        imports,
        container_type: http.container_type.clone(),
        middleware: http.middleware.iter().map(|mw| mw.name.clone()).collect(),
        routes,
        health_path: ts_string_literal(&http.health_path),
    }
    .render()
    .context("Failed to render router template")?;
    Ok(finish(rendered))
}

/// Render the queue dispatch module for `table`.
pub fn render_queue(
    table: &DispatchTable,
    config: &GeneratorConfig,
    root: &Path,
) -> anyhow::Result<String> {
    let queue = &config.queue;
    let out_dir = output_dir(root, &queue.output);
    ensure_identifier(&queue.container_type, "container type")?;
    ensure_identifier(&queue.env_type, "env type")?;

    let mut imports = vec![ImportLine::named(
        &queue.container_type,
        ts_string_literal(&queue.container_package),
    )];
    if let Some(env_module) = &queue.env_module {
        imports.push(ImportLine::named(
            &queue.env_type,
            ts_string_literal(&import_specifier(&out_dir, &root.join(env_module))),
        ));
    }
    imports.extend(class_imports(table, PipelineKind::Queue, root, &out_dir)?);

    let tasks = table
        .tasks
        .iter()
        .map(|task| TaskLine {
            queue: ts_string_literal(&task.queue_name),
            class_name: task.class_name.clone(),
            method: task.method_name.clone(),
            is_batch: task.is_batch,
        })
        .collect();

    let rendered = QueueTemplateData {
        imports,
        container_type: queue.container_type.clone(),
        env_type: queue.env_type.clone(),
        tasks,
    }
    .render()
    .context("Failed to render queue template")?;
    Ok(finish(rendered))
}

/// Render whichever module `kind` produces.
pub fn render_target(
    kind: PipelineKind,
    table: &DispatchTable,
    config: &GeneratorConfig,
    root: &Path,
) -> anyhow::Result<String> {
    match kind {
        PipelineKind::Http => render_router(table, config, root),
        PipelineKind::Queue => render_queue(table, config, root),
    }
}

/// Exactly one trailing newline.
fn finish(rendered: String) -> String {
    let mut out = rendered.trim_end().to_string();
    out.push('\n');
    out
}

/// Write a generated file atomically.
///
/// The contents go to a temporary file in the destination directory, which is
/// then renamed over `path`. A failed write leaves any previous file untouched.
pub fn write_generated(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {dir:?}"))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {dir:?}"))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write temporary file for {path:?}"))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush temporary file for {path:?}"))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to replace {path:?}"))?;
    Ok(())
}
