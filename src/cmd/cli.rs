#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    GenKey,
    Encrypt {
        input: String,
        output: String,
    },
    Decrypt {
        input: String,
        output: String,
    },
    Cat {
        file: String,
        offset: Option<u64>,
        length: Option<u64>,
    },
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Args {
    pub command: Option<Command>,
    pub short_help: bool,
    pub long_help: bool,
    pub version: bool,
}

impl Args {
    pub fn build_from_args<I>(mut cli_args: I) -> Result<Self, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut args = Self::default();

        while let Some(arg) = cli_args.next() {
            let some_command = args.command.is_some();

            match arg.as_ref() {
                "genkey" if !some_command => args.command = Some(Command::GenKey),
                "encrypt" if !some_command => {
                    let input = next_positional(&mut cli_args, "encrypt", "<in>")?;
                    let output = next_positional(&mut cli_args, "encrypt", "<out>")?;
                    args.command = Some(Command::Encrypt { input, output });
                }
                "decrypt" if !some_command => {
                    let input = next_positional(&mut cli_args, "decrypt", "<in>")?;
                    let output = next_positional(&mut cli_args, "decrypt", "<out>")?;
                    args.command = Some(Command::Decrypt { input, output });
                }
                "cat" if !some_command => {
                    let file = next_positional(&mut cli_args, "cat", "<file>")?;
                    let (offset, length) = parse_cat_options(&mut cli_args)?;
                    args.command = Some(Command::Cat {
                        file,
                        offset,
                        length,
                    });
                }
                "-h" => args.short_help = true,
                "--help" => args.long_help = true,
                "-V" | "--version" => args.version = true,
                unknown => {
                    return Err(format!("Unknown argument: '{unknown}'"));
                }
            }
        }

        Ok(args)
    }
}

fn next_positional<I>(cli_args: &mut I, command: &str, what: &str) -> Result<String, String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    cli_args
        .next()
        .map(|a| a.to_string())
        .ok_or_else(|| format!("'{command}' is missing the {what} argument"))
}

fn parse_cat_options<I>(cli_args: &mut I) -> Result<(Option<u64>, Option<u64>), String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    let mut offset = None;
    let mut length = None;

    while let Some(arg) = cli_args.next() {
        match arg.as_ref() {
            "--offset" => {
                let value = next_positional(cli_args, "cat", "--offset")?;
                offset = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --offset value: '{value}'"))?,
                );
            }
            "--length" => {
                let value = next_positional(cli_args, "cat", "--length")?;
                length = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --length value: '{value}'"))?,
                );
            }
            unknown => {
                return Err(format!("Unknown argument: '{unknown}'"));
            }
        }
    }

    Ok((offset, length))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::iter_on_single_items)]

    use super::*;

    #[test]
    fn command_genkey_regular() {
        let args = Args::build_from_args(["genkey"].iter()).unwrap();
        assert_eq!(args.command, Some(Command::GenKey));
    }

    #[test]
    fn second_command_does_not_override_genkey() {
        let err = Args::build_from_args(["genkey", "cat"].iter()).unwrap_err();
        assert!(err.contains("'cat'"));
    }

    #[test]
    fn command_encrypt_takes_input_and_output() {
        let args = Args::build_from_args(["encrypt", "a.txt", "a.enc"].iter()).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Encrypt {
                input: "a.txt".to_string(),
                output: "a.enc".to_string(),
            })
        );
    }

    #[test]
    fn command_encrypt_missing_output_is_error() {
        let err = Args::build_from_args(["encrypt", "a.txt"].iter()).unwrap_err();
        assert!(err.contains("<out>"));
    }

    #[test]
    fn command_decrypt_takes_input_and_output() {
        let args = Args::build_from_args(["decrypt", "a.enc", "a.txt"].iter()).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Decrypt {
                input: "a.enc".to_string(),
                output: "a.txt".to_string(),
            })
        );
    }

    #[test]
    fn command_cat_with_no_options() {
        let args = Args::build_from_args(["cat", "a.enc"].iter()).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Cat {
                file: "a.enc".to_string(),
                offset: None,
                length: None,
            })
        );
    }

    #[test]
    fn command_cat_with_offset_and_length() {
        let args =
            Args::build_from_args(["cat", "a.enc", "--offset", "10", "--length", "5"].iter())
                .unwrap();
        assert_eq!(
            args.command,
            Some(Command::Cat {
                file: "a.enc".to_string(),
                offset: Some(10),
                length: Some(5),
            })
        );
    }

    #[test]
    fn command_cat_invalid_offset_is_error() {
        let err = Args::build_from_args(["cat", "a.enc", "--offset", "nope"].iter()).unwrap_err();
        assert!(err.contains("Invalid --offset"));
    }

    #[test]
    fn command_unknown_is_error() {
        let err = Args::build_from_args(["unknown"].iter()).unwrap_err();
        assert!(err.contains("'unknown'"));
    }

    #[test]
    fn option_short_help_regular() {
        let args = Args::build_from_args(["-h"].iter()).unwrap();
        assert!(args.short_help);
        assert!(!args.long_help);
    }

    #[test]
    fn option_long_help_regular() {
        let args = Args::build_from_args(["--help"].iter()).unwrap();
        assert!(!args.short_help);
        assert!(args.long_help);
    }

    #[test]
    fn option_short_version_regular() {
        let args = Args::build_from_args(["-V"].iter()).unwrap();
        assert!(args.version);
    }

    #[test]
    fn option_long_version_regular() {
        let args = Args::build_from_args(["--version"].iter()).unwrap();
        assert!(args.version);
    }
}
