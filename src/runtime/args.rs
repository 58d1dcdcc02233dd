use std::path::PathBuf;

/// `roadie [--headless] [DIR]`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    /// Run without the terminal UI; controlled over MPRIS only.
    pub headless: bool,
    /// Library root; the working directory when absent.
    pub dir: Option<PathBuf>,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            match arg.as_str() {
                "--headless" => parsed.headless = true,
                _ if parsed.dir.is_none() => parsed.dir = Some(PathBuf::from(arg)),
                _ => {}
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_means_tui_in_working_directory() {
        assert_eq!(parse(&[]), Args::default());
    }

    #[test]
    fn headless_flag_and_directory_in_any_order() {
        let expected = Args {
            headless: true,
            dir: Some(PathBuf::from("/music")),
        };
        assert_eq!(parse(&["--headless", "/music"]), expected);
        assert_eq!(parse(&["/music", "--headless"]), expected);
    }

    #[test]
    fn first_directory_wins() {
        assert_eq!(parse(&["/a", "/b"]).dir, Some(PathBuf::from("/a")));
    }
}
