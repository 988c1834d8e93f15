//! Rust code generation from a [`NamespacesConfig`].

use file_local_ns::{CompilationUnit, ContinuationPoints, Inclusion, OverflowState};

use crate::toml_parser::{NamespaceEntry, NamespacesConfig};

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Rust source, meant for `include!`
    pub code: String,
    /// Every inclusion, declared namespaces first, then probes
    pub inclusions: Vec<Inclusion>,
    /// Set once an inclusion crossed the cutoff
    pub continuation: Option<ContinuationPoints>,
}

impl Generated {
    /// Inclusions added only to push the counter past the cutoff.
    pub fn probes(&self, declared: usize) -> &[Inclusion] {
        &self.inclusions[declared.min(self.inclusions.len())..]
    }

    /// The inclusion that crossed the cutoff, if any.
    pub fn crossing(&self) -> Option<&Inclusion> {
        self.inclusions
            .iter()
            .find(|inc| inc.state == OverflowState::OverflowEnter)
    }
}

/// Generate the namespace modules and aliases for `config`.
///
/// Each `[[namespace]]` is one inclusion into a fresh [`CompilationUnit`].
/// With `force_overflow`, empty probe namespaces follow until the
/// continuation points are defined.
pub fn generate_namespace_code(config: &NamespacesConfig) -> file_local_ns::Result<Generated> {
    let mut unit = CompilationUnit::new(config.generator.clone())?;
    let mut inclusions = Vec::with_capacity(config.len());
    let mut code = String::new();

    code.push_str("// Auto-generated by file-local-ns-build. Do not edit.\n");
    code.push_str("//\n");
    code.push_str("// Module names differ between builds; refer to them through the aliases.\n\n");

    for entry in config.entries() {
        let inclusion = unit.include()?;
        write_namespace(&mut code, &inclusion, Some(entry));
        inclusions.push(inclusion);
    }

    if config.force_overflow {
        while unit.continuation().is_err() {
            let inclusion = unit.include()?;
            write_namespace(&mut code, &inclusion, None);
            inclusions.push(inclusion);
        }
    }

    // The shorthand follows the most recent inclusion.
    if let Some(shorthand) = unit.shorthand() {
        write_alias(&mut code, shorthand.target.as_str(), &shorthand.alias);
        code.push('\n');
    }

    let continuation = unit.continuation().ok().cloned();
    if let Some(points) = &continuation {
        write_continuation(&mut code, points);
    }

    Ok(Generated {
        code,
        inclusions,
        continuation,
    })
}

fn write_namespace(code: &mut String, inclusion: &Inclusion, entry: Option<&NamespaceEntry>) {
    let name = inclusion.identifier.as_str();

    let reexports: String = entry
        .map(|e| {
            e.reexports
                .iter()
                .map(|path| format!("    pub use {};\n", path))
                .collect()
        })
        .unwrap_or_default();
    let spacer = if reexports.is_empty() { "" } else { "\n" };

    if entry.is_none() {
        code.push_str(&format!("// probe #{}\n", inclusion.ordinal));
    }
    code.push_str(&format!(
        "#[allow(non_snake_case, unused_imports)]
pub mod {name} {{
{reexports}{spacer}    #[doc(hidden)]
    pub fn __fln_len() -> usize {{
        {len}
    }}

    #[doc(hidden)]
    pub const fn __fln_counter() -> u64 {{
        {base}
    }}
}}

",
        len = inclusion.fallback.source(),
        base = inclusion.base,
    ));

    if let Some(alias) = entry.and_then(|e| e.alias.as_deref()) {
        write_alias(code, name, alias);
        code.push('\n');
    }
}

fn write_alias(code: &mut String, target: &str, alias: &str) {
    code.push_str(&format!(
        "#[allow(unused_imports)]\npub use {} as {};\n",
        target, alias
    ));
}

fn write_continuation(code: &mut String, points: &ContinuationPoints) {
    code.push_str(&format!(
        "/// Length from the namespace that crossed the cutoff.
pub fn continuation_len() -> usize {{
    {identifier}::__fln_len()
}}

/// Counter read right after the crossing.
pub const fn continuation_counter() -> u64 {{
    {counter}
}}

/// Counter read once the continuation was defined.
pub const fn continuation_final() -> u64 {{
    {final_counter}
}}
",
        identifier = points.identifier(),
        counter = points.counter(),
        final_counter = points.final_counter(),
    ));
}
