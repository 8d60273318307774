//! Signature normalization for header/impl symbol matching (spec §4.3 step 2):
//! collapse whitespace runs to single spaces, trim, drop redundant
//! parentheses around the whole signature.

pub fn normalize_signature(sig: &str) -> String {
    let collapsed = sig.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim();
    let mut s = trimmed;
    while s.starts_with('(') && s.ends_with(')') && has_matching_outer_parens(s) {
        s = &s[1..s.len() - 1];
        s = s.trim();
    }
    s.to_string()
}

fn has_matching_outer_parens(s: &str) -> bool {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != s.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize_signature("  int   add(int a,  int b) "), "int add(int a, int b)");
    }

    #[test]
    fn strips_redundant_outer_parens() {
        assert_eq!(normalize_signature("((int add(int a, int b)))"), "int add(int a, int b)");
    }

    #[test]
    fn leaves_inner_parens_alone() {
        assert_eq!(normalize_signature("int add(int a, int b)"), "int add(int a, int b)");
    }
}
