// Externals map - marks resolved packages as commonjs externals

use std::collections::BTreeMap;

/// Package name to bundler external spec (`"commonjs <name>"`)
pub type ExternalsMap = BTreeMap<String, String>;

/// Module type prefix the bundler uses to emit a runtime `require`
pub const COMMONJS_PREFIX: &str = "commonjs";

/// Build the externals entries for `names`
///
/// Repeated names simply overwrite themselves with the same value.
pub fn build_externals_map<S: AsRef<str>>(names: &[S]) -> ExternalsMap {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            (name.to_string(), format!("{} {}", COMMONJS_PREFIX, name))
        })
        .collect()
}
