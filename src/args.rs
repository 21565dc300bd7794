use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Push the given local files to the device.
    Push,
    /// Dump one remote file to stdout.
    Read(String),
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub files: Vec<PathBuf>,
    /// `-` was given: read paths from stdin, one per line.
    pub from_stdin: bool,
    pub dest: Option<String>,
    pub device: Option<String>,
    pub config: Option<PathBuf>,
    pub confirm_each: bool,
    pub no_summary: bool,
    pub quiet: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        Self::parse_from(env::args().skip(1))
    }

    pub fn parse_from(raw: impl IntoIterator<Item = String>) -> Option<Self> {
        let mut files: Vec<PathBuf> = Vec::new();
        let mut from_stdin = false;
        let mut dest: Option<String> = None;
        let mut device: Option<String> = None;
        let mut config: Option<PathBuf> = None;
        let mut read: Option<String> = None;
        let mut confirm_each = false;
        let mut no_summary = false;
        let mut quiet = false;

        for arg in raw {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("adb-wifi-push v{}", env!("APP_VERSION_DISPLAY"));
                return None;
            } else if arg == "--confirm" {
                confirm_each = true;
            } else if arg == "--no-summary" {
                no_summary = true;
            } else if arg == "--quiet" || arg == "-q" {
                quiet = true;
            } else if arg == "-" {
                from_stdin = true;
            } else if let Some(val) = arg.strip_prefix("--dest=") {
                dest = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--device=") {
                device = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--read=") {
                read = Some(val.to_string());
            } else if arg.starts_with('-') && arg != "-" {
                eprintln!("❌ Unknown argument: {arg}");
                print_help();
                return None;
            } else {
                files.push(PathBuf::from(arg));
            }
        }

        let mode = match read {
            Some(remote) => {
                if !files.is_empty() || from_stdin {
                    eprintln!("❌ --read cannot be combined with files to push");
                    return None;
                }
                Mode::Read(remote)
            }
            None => {
                if files.is_empty() && !from_stdin {
                    eprintln!("❌ No files given (pass paths, or '-' to read them from stdin)");
                    print_help();
                    return None;
                }
                // Both the item stream and the prompt would read from stdin.
                if from_stdin && confirm_each {
                    eprintln!("❌ --confirm cannot be combined with '-' (file paths occupy stdin)");
                    return None;
                }
                Mode::Push
            }
        };

        Some(Args {
            mode,
            files,
            from_stdin,
            dest,
            device,
            config,
            confirm_each,
            no_summary,
            quiet,
        })
    }
}

fn print_help() {
    println!("📲 adb-wifi-push - push files to a wifi-connected Android device");
    println!();
    println!("USAGE:");
    println!("    adb-wifi-push [FLAGS] <FILE>...");
    println!("    adb-wifi-push [FLAGS] -              (read file paths from stdin)");
    println!("    adb-wifi-push --read=<REMOTE_PATH>   (dump a remote file to stdout)");
    println!();
    println!("FLAGS:");
    println!("    --dest=<DIR>        Remote destination directory (default from config)");
    println!("    --device=<ADDR[:PORT]>  Device endpoint (default from config)");
    println!("    --config=<FILE>     Config file (default ~/.config/adb-wifi-push/config.toml)");
    println!("    --confirm           Ask before pushing each file");
    println!("    --no-summary        Suppress the end-of-batch summary line");
    println!("    --quiet, -q         No progress or per-file success output");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    adb-wifi-push --device=192.168.1.20 photo.jpg notes.txt");
    println!("    find . -name '*.gpx' | adb-wifi-push --dest=/sdcard/tracks -");
    println!("    adb-wifi-push --read=/sdcard/Download/notes.txt > notes.txt");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Option<Args> {
        Args::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parse_files_and_flags() {
        let args = parse(&[
            "--dest=/sdcard/tracks",
            "--device=192.168.1.20:5555",
            "--confirm",
            "a.gpx",
            "b.gpx",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::Push);
        assert_eq!(args.files, vec![PathBuf::from("a.gpx"), PathBuf::from("b.gpx")]);
        assert_eq!(args.dest.as_deref(), Some("/sdcard/tracks"));
        assert_eq!(args.device.as_deref(), Some("192.168.1.20:5555"));
        assert!(args.confirm_each);
        assert!(!args.from_stdin);
    }

    #[test]
    fn dash_enables_stdin_streaming() {
        let args = parse(&["-"]).unwrap();
        assert!(args.from_stdin);
        assert!(args.files.is_empty());
        assert_eq!(args.mode, Mode::Push);
    }

    #[test]
    fn read_mode() {
        let args = parse(&["--read=/sdcard/Download/notes.txt"]).unwrap();
        assert_eq!(args.mode, Mode::Read("/sdcard/Download/notes.txt".to_string()));
    }

    #[test]
    fn read_mode_rejects_push_files() {
        assert!(parse(&["--read=/sdcard/x", "local.txt"]).is_none());
    }

    #[test]
    fn no_files_is_rejected() {
        assert!(parse(&[]).is_none());
        assert!(parse(&["--quiet"]).is_none());
    }

    #[test]
    fn confirm_cannot_read_from_occupied_stdin() {
        assert!(parse(&["--confirm", "-"]).is_none());
        assert!(parse(&["--confirm", "a.txt"]).is_some());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse(&["--frobnicate", "a.txt"]).is_none());
    }
}
