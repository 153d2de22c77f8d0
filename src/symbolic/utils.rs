// the collection of utility functions mainly for bracket parsing and proceeding

/// true if every round bracket is closed in the right order
pub fn brackets_balanced(s: &str) -> bool {
    let mut depth: i64 = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// position of the bracket closing the one opened at `bracket_start`
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    let mut stack = 0usize;
    for (i, c) in input.char_indices().skip_while(|(i, _)| *i < bracket_start) {
        if c == '(' {
            stack += 1;
        } else if c == ')' {
            stack = stack.checked_sub(1)?;
            if stack == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// the whole string is wrapped in one pair of brackets, e.g. "(n+1)" but not "(n)+(1)"
pub fn enclosed_in_brackets(input: &str) -> bool {
    input.starts_with('(') && find_pair_to_this_bracket(input, 0) == Some(input.len() - 1)
}

/// positions of the given chars that are outside brackets only, in order of appearance
pub fn find_char_positions_outside_brackets(input: &str, targets: &[char]) -> Vec<(usize, char)> {
    let mut depth = 0i64;
    let mut positions = Vec::new();
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && targets.contains(&c) => positions.push((i, c)),
            _ => {}
        }
    }
    positions
}

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_values as f64 - 1.0);
            (0..num_values)
                .map(|i| start + (i as f64 * step))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_brackets_balanced() {
        assert!(brackets_balanced("log(n+(1))"));
        assert!(brackets_balanced("n"));
        assert!(!brackets_balanced("(n+1"));
        assert!(!brackets_balanced(")n("));
    }

    #[test]
    fn test_find_pair_to_this_bracket() {
        assert_eq!(find_pair_to_this_bracket("(n+(1))*2", 0), Some(6));
        assert_eq!(find_pair_to_this_bracket("(n+(1))*2", 3), Some(5));
        assert_eq!(find_pair_to_this_bracket("(n", 0), None);
    }

    #[test]
    fn test_enclosed_in_brackets() {
        assert!(enclosed_in_brackets("(n+1)"));
        assert!(!enclosed_in_brackets("(n)+(1)"));
        assert!(!enclosed_in_brackets("n"));
    }

    #[test]
    fn test_operator_positions_skip_brackets() {
        let positions = find_char_positions_outside_brackets("n*(n+1)-2", &['+', '-']);
        assert_eq!(positions, vec![(7, '-')]);
    }

    #[test]
    fn test_linspace() {
        let grid = linspace(1.0, 80.0, 400);
        assert_eq!(grid.len(), 400);
        assert_relative_eq!(grid[0], 1.0);
        assert_relative_eq!(grid[399], 80.0, epsilon = 1e-12);
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
