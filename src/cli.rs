use super::script::OutputFormat;
use super::{Result, TabplotError, Variant, DEFAULT_HEIGHT, DEFAULT_WIDTH, VERSION};
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;

/// Everything the command line controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub x: String,
    pub y: Vec<String>,
    pub y2: Vec<String>,
    pub sets: Vec<usize>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub verbose: bool,
    pub list_metadata: bool,
}

/// multi-letter single-dash flags clap cannot express as shorts
const LEGACY_FLAGS: [(&str, &str); 3] = [("-y2", "--y2"), ("-ow", "--ow"), ("-oh", "--oh")];

/// `-y2` or `-y2=VALUE` as `--y2` or `--y2=VALUE`, none for anything else
fn long_form(arg: &str) -> Option<String> {
    LEGACY_FLAGS.iter().find_map(|(short, long)| {
        let rest = arg.strip_prefix(short)?;
        if rest.is_empty() || rest.starts_with('=') {
            Some(format!("{}{}", long, rest))
        } else {
            None
        }
    })
}

/// Rewrites `-y2`, `-ow` and `-oh`, alone or with `=VALUE`, to their long forms.
pub fn normalize_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let long = arg.to_str().and_then(long_form);
            match long {
                Some(l) => OsString::from(l),
                None => arg,
            }
        })
        .collect()
}

fn build_app(variant: Variant) -> App<'static, 'static> {
    let arg_input = Arg::with_name("input")
        .help("data file, blank line separated sets with optional # name and # columns headers; stdin if missing")
        .index(1);
    let arg_x = Arg::with_name("x")
        .help("x axis COLUMN=LABEL, COLUMN or LABEL")
        .short("x")
        .long("x")
        .takes_value(true)
        .value_name("COLUMN=LABEL")
        .default_value(variant.default_x);
    let arg_y = Arg::with_name("y")
        .help("y axis COLUMN=LABEL, repeatable; defaults to the column after x")
        .short("y")
        .long("y")
        .takes_value(true)
        .value_name("COLUMN=LABEL")
        .multiple(true)
        .number_of_values(1);
    let arg_y2 = Arg::with_name("y2")
        .help("secondary y axis COLUMN=LABEL, repeatable (also -y2)")
        .long("y2")
        .takes_value(true)
        .value_name("COLUMN=LABEL")
        .multiple(true)
        .number_of_values(1);
    let arg_sets = Arg::with_name("sets")
        .help("plot only this data set, repeatable; all sets by default")
        .short("s")
        .long("set")
        .takes_value(true)
        .value_name("N")
        .multiple(true)
        .number_of_values(1);
    let arg_output = Arg::with_name("output")
        .help("output file; text plot on stdout if missing")
        .short("o")
        .long("output")
        .takes_value(true)
        .value_name("PATH");
    let arg_format = Arg::with_name("format")
        .help("output format, guessed from the output file extension if missing")
        .short("f")
        .long("output-format")
        .takes_value(true)
        .possible_values(&["txt", "svg", "png"]);
    let arg_width = Arg::with_name("width")
        .help("image width for svg and png [default: 1000] (also -ow)")
        .long("ow")
        .takes_value(true)
        .value_name("WIDTH");
    let arg_height = Arg::with_name("height")
        .help("image height for svg and png [default: 500] (also -oh)")
        .long("oh")
        .takes_value(true)
        .value_name("HEIGHT");
    let arg_title = Arg::with_name("title")
        .help("plot title")
        .short("t")
        .long("title")
        .takes_value(true);
    let arg_verbose = Arg::with_name("verbose")
        .help("print the gnuplot script and command")
        .short("v")
        .long("verbose")
        .takes_value(false);
    let app = App::new(variant.name)
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to plot blank line separated data sets with gnuplot")
        .arg(arg_input)
        .arg(arg_x)
        .arg(arg_y)
        .arg(arg_y2)
        .arg(arg_sets)
        .arg(arg_output)
        .arg(arg_format)
        .arg(arg_width)
        .arg(arg_height)
        .arg(arg_title)
        .arg(arg_verbose);
    if variant.list_metadata {
        let arg_list = Arg::with_name("list_metadata")
            .help("print the data sets and their columns, then exit")
            .short("l")
            .long("list-metadata")
            .takes_value(false);
        app.arg(arg_list)
    } else {
        app
    }
}

fn values(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .values_of(name)
        .map(|v| v.map(String::from).collect())
        .unwrap_or_default()
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &'static str) -> Result<T> {
    value.parse::<T>().map_err(|_| TabplotError::InvalidNumber {
        what,
        value: value.to_string(),
    })
}

/// Takes the CLI arguments (program name first) that control the plot.
pub fn parse_cli_from<I, T>(variant: Variant, args: I) -> Result<Options>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let matches = build_app(variant).get_matches_from_safe(normalize_flags(args))?;
    let sets = values(&matches, "sets")
        .iter()
        .map(|s| parse_number(s, "data set"))
        .collect::<Result<Vec<usize>>>()?;
    let width = match matches.value_of("width") {
        Some(w) => parse_number(w, "width")?,
        None => DEFAULT_WIDTH,
    };
    let height = match matches.value_of("height") {
        Some(h) => parse_number(h, "height")?,
        None => DEFAULT_HEIGHT,
    };
    let format = match matches.value_of("format") {
        Some(f) => Some(f.parse::<OutputFormat>()?),
        None => None,
    };
    Ok(Options {
        input: matches.value_of_os("input").map(PathBuf::from),
        x: matches.value_of("x").unwrap_or(variant.default_x).to_string(),
        y: values(&matches, "y"),
        y2: values(&matches, "y2"),
        sets,
        output: matches.value_of_os("output").map(PathBuf::from),
        format,
        width,
        height,
        title: matches.value_of("title").map(String::from),
        verbose: matches.is_present("verbose"),
        list_metadata: matches.is_present("list_metadata"),
    })
}

/// Takes the CLI arguments of the running process.
pub fn parse_cli(variant: Variant) -> Result<Options> {
    parse_cli_from(variant, std::env::args_os())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(variant: Variant, args: &[&str]) -> Result<Options> {
        let mut full = vec![variant.name];
        full.extend_from_slice(args);
        parse_cli_from(variant, full)
    }

    #[rstest]
    #[case::lines(Variant::LINES, "1")]
    #[case::points(Variant::POINTS, "0")]
    fn defaults(#[case] variant: Variant, #[case] x: &str) {
        let options = parse(variant, &[]).expect("no arguments is valid");
        assert_eq!(
            options,
            Options {
                input: None,
                x: x.to_string(),
                y: vec![],
                y2: vec![],
                sets: vec![],
                output: None,
                format: None,
                width: 1000,
                height: 500,
                title: None,
                verbose: false,
                list_metadata: false,
            }
        );
    }

    #[test]
    fn all_flags() {
        let options = parse(
            Variant::LINES,
            &[
                "data.txt", "-x", "1=time", "-y", "2", "-y", "load", "-y2", "3=temp", "-s", "0",
                "-y2=4=hum", "-s", "2", "-o", "out.png", "-f", "svg", "-ow", "800", "-oh=300",
                "-t", "loads", "-v", "-l",
            ],
        )
        .expect("valid arguments");
        assert_eq!(options.input, Some(PathBuf::from("data.txt")));
        assert_eq!(options.x, "1=time");
        assert_eq!(options.y, vec!["2", "load"]);
        assert_eq!(options.y2, vec!["3=temp", "4=hum"]);
        assert_eq!(options.sets, vec![0, 2]);
        assert_eq!(options.output, Some(PathBuf::from("out.png")));
        assert_eq!(options.format, Some(OutputFormat::Svg));
        assert_eq!((options.width, options.height), (800, 300));
        assert_eq!(options.title.as_deref(), Some("loads"));
        assert!(options.verbose);
        assert!(options.list_metadata);
    }

    #[test]
    fn long_forms() {
        let options = parse(
            Variant::POINTS,
            &["--y2", "2", "--ow", "10", "--oh", "20", "--output-format", "txt"],
        )
        .expect("valid arguments");
        assert_eq!(options.y2, vec!["2"]);
        assert_eq!((options.width, options.height), (10, 20));
        assert_eq!(options.format, Some(OutputFormat::Txt));
    }

    #[test]
    fn points_variant_has_no_listing() {
        assert!(parse(Variant::POINTS, &["-l"]).is_err());
    }

    #[rstest]
    #[case(&["-f", "pdf"])]
    #[case(&["--bogus"])]
    fn clap_rejects(#[case] args: &[&str]) {
        let err = parse(Variant::LINES, args).expect_err("invalid arguments");
        assert!(matches!(err, TabplotError::Usage(_)));
    }

    #[rstest]
    #[case(&["-s", "first"], "invalid data set: first")]
    #[case(&["-ow", "wide"], "invalid width: wide")]
    #[case(&["-oh", "1.5"], "invalid height: 1.5")]
    fn rejects_bad_numbers(#[case] args: &[&str], #[case] message: &str) {
        let err = parse(Variant::LINES, args).expect_err("invalid number");
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn normalizes_only_legacy_flags() {
        let args = normalize_flags(vec!["-y2", "-y", "2", "-ow", "-oh", "-o"]);
        assert_eq!(args, vec!["--y2", "-y", "2", "--ow", "--oh", "-o"]);
    }

    #[test]
    fn normalizes_legacy_flags_with_values() {
        let args = normalize_flags(vec!["-y2=3=sq", "-ow=800", "-oh=", "-y2x", "-owl", "-y=2"]);
        assert_eq!(
            args,
            vec!["--y2=3=sq", "--ow=800", "--oh=", "-y2x", "-owl", "-y=2"]
        );
    }

    #[test]
    fn equals_spellings_reach_their_own_flags() {
        let options = parse(Variant::LINES, &["-y2=3=sq", "-ow=800", "-oh=200"])
            .expect("valid arguments");
        assert!(options.y.is_empty());
        assert_eq!(options.y2, vec!["3=sq"]);
        assert_eq!(options.output, None);
        assert_eq!((options.width, options.height), (800, 200));
    }
}
