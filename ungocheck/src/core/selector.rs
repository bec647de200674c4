//! Split a `go test` argument list into package selectors.

/// Selector used when the invocation names no packages.
pub const DEFAULT_SELECTOR: &str = ".";

/// Suffix requesting recursive package expansion.
pub const RECURSIVE_SUFFIX: &str = "/...";

/// `go test` flags whose value may be passed as the next argument.
///
/// Listed without the leading dash and without the optional `test.` prefix.
const VALUE_FLAGS: &[&str] = &[
    "asmflags",
    "bench",
    "benchtime",
    "blockprofile",
    "blockprofilerate",
    "buildmode",
    "C",
    "compiler",
    "count",
    "covermode",
    "coverpkg",
    "coverprofile",
    "cpu",
    "cpuprofile",
    "exec",
    "fuzz",
    "fuzzminimizetime",
    "fuzztime",
    "gccgoflags",
    "gcflags",
    "installsuffix",
    "ldflags",
    "list",
    "memprofile",
    "memprofilerate",
    "mod",
    "modfile",
    "mutexprofile",
    "mutexprofilefraction",
    "o",
    "outputdir",
    "overlay",
    "p",
    "parallel",
    "pgo",
    "pkgdir",
    "run",
    "shuffle",
    "skip",
    "tags",
    "timeout",
    "toolexec",
    "trace",
    "vet",
];

/// Everything after this flag is handed to the test binary.
const ARGS_FLAG: &str = "-args";

/// Extract package selectors from invocation arguments.
///
/// Arguments starting with `-` are runner flags and never selectors, nor is
/// the separate value of a value-taking flag (`-run TestX`). Arguments after
/// `-args` belong to the test binary. Falls back to `["."]` when nothing is
/// left.
pub fn package_selectors<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut args = args.iter().map(AsRef::<str>::as_ref);
    while let Some(arg) = args.next() {
        if arg == ARGS_FLAG || arg == "--args" {
            break;
        }
        if arg.starts_with('-') {
            if takes_separate_value(arg) {
                args.next();
            }
            continue;
        }
        selectors.push(arg.to_string());
    }
    if selectors.is_empty() {
        selectors.push(DEFAULT_SELECTOR.to_string());
    }
    selectors
}

fn takes_separate_value(flag: &str) -> bool {
    let name = flag.trim_start_matches('-');
    if name.contains('=') {
        return false;
    }
    let name = name.strip_prefix("test.").unwrap_or(name);
    VALUE_FLAGS.contains(&name)
}

/// Split `pkg/...` into `(pkg, true)`; other selectors yield `(sel, false)`.
///
/// A bare `...` expands from the working directory.
pub fn split_recursive(selector: &str) -> (&str, bool) {
    if selector == "..." {
        return (DEFAULT_SELECTOR, true);
    }
    match selector.strip_suffix(RECURSIVE_SUFFIX) {
        Some("") => ("/", true),
        Some(base) => (base, true),
        None => (selector, false),
    }
}

/// True for selectors naming a filesystem path rather than an import path.
pub fn is_local(selector: &str) -> bool {
    selector == "."
        || selector == ".."
        || selector.starts_with("./")
        || selector.starts_with("../")
        || selector.starts_with('/')
}
