/// Builds a [`Document`](crate::Document) from section and setting literals.
///
/// Sections and settings are added in the order written. Values may be any expression
/// implementing `Display`.
///
/// ```rust
/// use mini_ini::ini;
///
/// let port = 8080;
/// let document = ini! {
///     "Server" => {
///         "host" => "localhost",
///         "port" => port,
///     },
///     "Empty" => {},
/// };
/// assert_eq!(document.to_string(), "[Server]\nhost=localhost\nport=8080\n[Empty]\n");
/// ```
#[macro_export]
macro_rules! ini {
    () => {
        $crate::Document::new()
    };

    ($($section:expr => { $($key:expr => $value:expr),* $(,)? }),* $(,)?) => {{
        let mut document = $crate::Document::new();
        $(
            let section = document.section_mut(&$section);
            $(
                section.set(&$key, ($value).to_string());
            )*
            let _ = section;
        )*
        document
    }};
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn test_ini_macro_empty() {
        assert_eq!(ini!(), Document::new());
        assert!(ini!().is_empty());
    }

    #[test]
    fn test_ini_macro_sections() {
        let document = ini! {
            "A" => { "x" => 1, "y" => true },
            "B" => { "z" => 2.5 }
        };
        assert_eq!(document.get("A", "x"), Some("1"));
        assert_eq!(document.get("A", "y"), Some("true"));
        assert_eq!(document.get("B", "z"), Some("2.5"));
        assert_eq!(document.to_string(), "[A]\nx=1\ny=true\n[B]\nz=2.5\n");
    }

    #[test]
    fn test_ini_macro_expression_names() {
        let name = String::from("Dynamic");
        let key = "k";
        let document = ini! { name => { key => "v" } };
        assert_eq!(document.get("Dynamic", "k"), Some("v"));
    }
}
