/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Simple `*` glob matching for header-name patterns: exact names,
//! `foo*`, `*foo`, `*mid*`, and combinations thereof. Callers normalize
//! case before matching.

/// Matches `value` against `pattern`, where `*` matches any run of
/// characters (including none).
pub(crate) fn simple_match(pattern: &str, value: &str) -> bool {
    let Some(first_star) = pattern.find('*') else {
        return pattern == value;
    };
    if first_star > 0 {
        let head = &pattern[..first_star];
        let Some(rest) = value.strip_prefix(head) else {
            return false;
        };
        return simple_match(&pattern[first_star..], rest);
    }
    // Pattern starts with '*'.
    let rest = &pattern[1..];
    if rest.is_empty() {
        return true;
    }
    match rest.find('*') {
        None => value.ends_with(rest),
        Some(next_star) if next_star == 0 => simple_match(rest, value),
        Some(next_star) => {
            let part = &rest[..next_star];
            let tail = &rest[next_star..];
            let mut search_from = 0;
            while let Some(found) = value[search_from..].find(part) {
                let start = search_from + found;
                if simple_match(tail, &value[start + part.len()..]) {
                    return true;
                }
                search_from = start
                    + value[start..]
                        .chars()
                        .next()
                        .map_or(1, |c| c.len_utf8());
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::simple_match;

    #[test]
    fn exact_names_match_literally() {
        assert!(simple_match("contenttype", "contenttype"));
        assert!(!simple_match("contenttype", "contentlength"));
    }

    #[test]
    fn prefix_patterns() {
        assert!(simple_match("x-*", "x-trace-id"));
        assert!(simple_match("x-*", "x-"));
        assert!(!simple_match("x-*", "y-trace-id"));
    }

    #[test]
    fn suffix_patterns() {
        assert!(simple_match("*-id", "trace-id"));
        assert!(!simple_match("*-id", "trace-ident"));
    }

    #[test]
    fn contains_patterns() {
        assert!(simple_match("*trace*", "x-trace-id"));
        assert!(simple_match("*trace*", "trace"));
        assert!(!simple_match("*trace*", "x-span-id"));
    }

    #[test]
    fn lone_star_matches_everything() {
        assert!(simple_match("*", ""));
        assert!(simple_match("*", "anything"));
    }

    #[test]
    fn interior_star() {
        assert!(simple_match("x-*-id", "x-trace-id"));
        assert!(!simple_match("x-*-id", "x-trace-key"));
    }
}
