use any_ascii::any_ascii;

/// Converts an API property name into a Terraform identifier.
///
/// Non-alphanumerics act as separators, an acronym run is split before a
/// trailing capitalised word (`HTTPClient` -> `http_client`) except for a lone
/// plural `s` (`IPs` -> `ips`), and a leading digit gets a `field_` prefix.
pub(crate) fn to_snake_case(input: &str) -> String {
  let chars = any_ascii(input).chars().collect::<Vec<_>>();
  let mut out = String::with_capacity(chars.len() + 4);
  let mut prev_was_underscore = false;
  let mut wrote_any = false;

  for (i, &c) in chars.iter().enumerate() {
    if !c.is_ascii_alphanumeric() {
      if wrote_any && !prev_was_underscore {
        out.push('_');
        prev_was_underscore = true;
      }
      continue;
    }

    if c.is_ascii_uppercase()
      && let Some(prev) = previous_alnum(&chars, i)
    {
      if (prev.is_ascii_lowercase() || prev.is_ascii_digit()) && !prev_was_underscore {
        out.push('_');
      }

      if prev.is_ascii_uppercase()
        && let Some(next) = next_alnum(&chars, i)
        && next.is_ascii_lowercase()
        && !prev_was_underscore
      {
        let lower_run = lowercase_run(&chars, i + 1);
        if lower_run > 1 || (lower_run == 1 && next != 's') {
          out.push('_');
        }
      }
    }

    out.push(c.to_ascii_lowercase());
    wrote_any = true;
    prev_was_underscore = false;
  }

  let trimmed = out.trim_matches('_');
  if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
    format!("field_{trimmed}")
  } else {
    trimmed.to_string()
  }
}

fn previous_alnum(chars: &[char], i: usize) -> Option<char> {
  chars[..i].iter().rev().copied().find(char::is_ascii_alphanumeric)
}

fn next_alnum(chars: &[char], i: usize) -> Option<char> {
  chars[i + 1..].iter().copied().find(char::is_ascii_alphanumeric)
}

/// Width of the lowercase run starting at `start`, separators included.
fn lowercase_run(chars: &[char], start: usize) -> usize {
  let mut end = start;
  while let Some(&c) = chars.get(end) {
    if c.is_ascii_alphanumeric() && !c.is_ascii_lowercase() {
      break;
    }
    end += 1;
  }
  end - start
}

/// Whether `key` can be written as a bare HCL object key.
pub(crate) fn is_hcl_identifier(key: &str) -> bool {
  let mut chars = key.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  (first == '_' || first.is_alphabetic()) && chars.all(|c| c == '_' || c == '-' || c.is_alphanumeric())
}

/// Object key as written in generated HCL, quoted when it is not an identifier.
pub(crate) fn object_key(key: &str) -> String {
  if is_hcl_identifier(key) {
    key.to_string()
  } else {
    quoted(key)
  }
}

/// HCL string literal for `text`, with template markers escaped.
pub(crate) fn quoted(text: &str) -> String {
  serde_json::Value::String(escape_template(text)).to_string()
}

/// Escapes `${` and `%{` so text is never read as a template sequence.
pub(crate) fn escape_template(text: &str) -> String {
  text.replace("${", "$${").replace("%{", "%%{")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_to_snake_case() {
    let cases = [
      ("camelCase", "camel_case"),
      ("PascalCase", "pascal_case"),
      ("resourceID", "resource_id"),
      ("HTTPClient", "http_client"),
      ("publicIPs", "public_ips"),
      ("VMSizes", "vm_sizes"),
      ("enableHttp2", "enable_http2"),
      ("kebab-case-name", "kebab_case_name"),
      ("already_snake", "already_snake"),
      ("__leading", "leading"),
      ("2fa", "field_2fa"),
      ("x-ms-client-name", "x_ms_client_name"),
      ("", ""),
      ("---", ""),
    ];

    for (input, expected) in cases {
      assert_eq!(to_snake_case(input), expected, "input {input:?}");
    }
  }

  #[test]
  fn test_to_snake_case_transliterates() {
    assert_eq!(to_snake_case("größeMax"), "grosse_max");
  }

  #[test]
  fn test_is_hcl_identifier() {
    assert!(is_hcl_identifier("name"));
    assert!(is_hcl_identifier("_private"));
    assert!(is_hcl_identifier("with-dash"));
    assert!(!is_hcl_identifier("1st"));
    assert!(!is_hcl_identifier("rules[]"));
    assert!(!is_hcl_identifier("a.b"));
    assert!(!is_hcl_identifier(""));
  }

  #[test]
  fn test_object_key_quotes_non_identifiers() {
    assert_eq!(object_key("sku"), "sku");
    assert_eq!(object_key("odata.type"), "\"odata.type\"");
  }

  #[test]
  fn test_quoted_escapes_templates() {
    assert_eq!(quoted("say \"hi\""), r#""say \"hi\"""#);
    assert_eq!(quoted("${var.x} and %{if}"), r#""$${var.x} and %%{if}""#);
  }
}
