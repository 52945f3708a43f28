//! Lightweight GLSL scan for top-level `uniform` declarations.
//!
//! This does not parse GLSL. It strips comments and preprocessor lines,
//! splits on `;`, and picks up statements of the form
//! `[layout(..)] uniform [precision] <type> <name>[, <name>..]`. Anything up
//! to the last `}` of a statement belongs to a preceding function or struct
//! body and is dropped. Uniform blocks are skipped, their members are not
//! addressable by plain name.
use crate::kind::ParamKind;

const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredUniform {
    pub name: String,
    /// Type keyword exactly as written in the source.
    pub glsl_type: String,
    /// `None` for arrays and for types the parameter table does not model.
    pub kind: Option<ParamKind>,
}

/// Returns the uniforms declared in `source`, in declaration order.
pub fn declared_uniforms(source: &str) -> Vec<DeclaredUniform> {
    let stripped = strip_comments(source);
    let code: String = stripped
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let mut uniforms = Vec::new();
    let mut in_block = false;
    for statement in code.split(';') {
        if in_block {
            if statement.contains('}') {
                in_block = false;
            }
            continue;
        }

        let statement = statement.rsplit('}').next().unwrap_or_default();
        let statement = skip_layout(statement.trim());
        let mut tokens = statement.split_whitespace();
        if tokens.next() != Some("uniform") {
            continue;
        }
        if statement.contains('{') {
            in_block = true;
            continue;
        }

        let mut glsl_type = None;
        for token in tokens.by_ref() {
            if !PRECISION_QUALIFIERS.contains(&token) {
                glsl_type = Some(token);
                break;
            }
        }
        let Some(glsl_type) = glsl_type else {
            continue;
        };

        let declarators: String = tokens.collect::<Vec<_>>().join(" ");
        for declarator in declarators.split(',') {
            let declarator = declarator.split('=').next().unwrap_or_default().trim();
            let (name, is_array) = match declarator.find('[') {
                Some(index) => (declarator[..index].trim(), true),
                None => (declarator, false),
            };
            if name.is_empty() {
                continue;
            }
            uniforms.push(DeclaredUniform {
                name: name.to_string(),
                glsl_type: glsl_type.to_string(),
                kind: if is_array {
                    None
                } else {
                    ParamKind::from_glsl(glsl_type)
                },
            });
        }
    }
    uniforms
}

fn skip_layout(statement: &str) -> &str {
    let Some(rest) = statement.strip_prefix("layout") else {
        return statement;
    };
    match rest.find(')') {
        Some(index) => rest[index + 1..].trim_start(),
        None => statement,
    }
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '/' {
            match chars.peek() {
                Some('/') => {
                    for next in chars.by_ref() {
                        if next == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut previous = '\0';
                    for next in chars.by_ref() {
                        if previous == '*' && next == '/' {
                            break;
                        }
                        if next == '\n' {
                            out.push('\n');
                        }
                        previous = next;
                    }
                    out.push(' ');
                    continue;
                }
                _ => {}
            }
        }
        out.push(ch);
    }
    out
}
