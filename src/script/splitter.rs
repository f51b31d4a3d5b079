/// Split script text into executable statements.
///
/// Splitting is purely textual: a delimiter inside a string literal or a
/// comment still ends the statement. Pieces are trimmed, and pieces that are
/// empty or hold nothing but `--` comment lines are dropped. With
/// `strip_line_comments`, `--` comment lines are removed from the statements
/// that remain.
#[must_use]
pub fn split_statements(text: &str, delimiter: &str, strip_line_comments: bool) -> Vec<String> {
    text.split(delimiter)
        .filter(|piece| !is_comment_only(piece))
        .map(|piece| {
            if strip_line_comments {
                piece
                    .lines()
                    .filter(|line| !is_line_comment(line))
                    .collect::<Vec<_>>()
                    .join("\n")
                    .trim()
                    .to_string()
            } else {
                piece.trim().to_string()
            }
        })
        .collect()
}

fn is_line_comment(line: &str) -> bool {
    line.trim_start().starts_with("--")
}

fn is_comment_only(piece: &str) -> bool {
    piece
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| line.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_trims_and_skips_blank_pieces() {
        let script = "create table t (id int);\n\n  insert into t values (1) ;\n;\n-- done\n";
        assert_eq!(
            split_statements(script, ";", false),
            vec!["create table t (id int)", "insert into t values (1)"]
        );
    }

    #[test]
    fn custom_delimiter() {
        let script = "select 1\ngo\nselect 2\ngo\n";
        assert_eq!(split_statements(script, "\ngo\n", false), vec!["select 1", "select 2"]);
    }

    #[test]
    fn line_comments_kept_or_stripped() {
        let script = "-- seed data\ninsert into t values (1);";
        assert_eq!(
            split_statements(script, ";", false),
            vec!["-- seed data\ninsert into t values (1)"]
        );
        assert_eq!(split_statements(script, ";", true), vec!["insert into t values (1)"]);
    }

    #[test]
    fn delimiter_inside_literal_still_splits() {
        let script = "insert into t values ('a;b');";
        assert_eq!(
            split_statements(script, ";", false),
            vec!["insert into t values ('a", "b')"]
        );
    }
}
