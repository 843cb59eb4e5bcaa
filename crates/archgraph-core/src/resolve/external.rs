//! Classification of unresolved references into ecosystems.

use crate::language::{Ecosystem, Language};

/// Python standard library top-level modules.
const PYTHON_STDLIB: &[&str] = &[
    "__future__", "_thread", "abc", "argparse", "array", "ast", "asyncio", "atexit", "base64",
    "bdb", "binascii", "bisect", "builtins", "bz2", "calendar", "cgi", "cmath", "cmd", "code",
    "codecs", "collections", "colorsys", "compileall", "concurrent", "configparser",
    "contextlib", "contextvars", "copy", "copyreg", "cProfile", "csv", "ctypes", "curses",
    "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis", "doctest", "email",
    "encodings", "ensurepip", "enum", "errno", "faulthandler", "fcntl", "filecmp", "fileinput",
    "fnmatch", "fractions", "ftplib", "functools", "gc", "getopt", "getpass", "gettext", "glob",
    "graphlib", "grp", "gzip", "hashlib", "heapq", "hmac", "html", "http", "imaplib",
    "importlib", "inspect", "io", "ipaddress", "itertools", "json", "keyword", "linecache",
    "locale", "logging", "lzma", "mailbox", "marshal", "math", "mimetypes", "mmap",
    "multiprocessing", "netrc", "numbers", "operator", "optparse", "os", "pathlib", "pdb",
    "pickle", "pkgutil", "platform", "plistlib", "poplib", "posix", "pprint", "profile",
    "pstats", "pty", "pwd", "py_compile", "queue", "quopri", "random", "re", "readline",
    "reprlib", "resource", "rlcompleter", "runpy", "sched", "secrets", "select", "selectors",
    "shelve", "shlex", "shutil", "signal", "site", "smtplib", "socket", "socketserver",
    "sqlite3", "ssl", "stat", "statistics", "string", "stringprep", "struct", "subprocess",
    "symtable", "sys", "sysconfig", "syslog", "tabnanny", "tarfile", "tempfile", "termios",
    "textwrap", "threading", "time", "timeit", "tkinter", "token", "tokenize", "tomllib",
    "trace", "traceback", "tracemalloc", "tty", "turtle", "types", "typing", "unicodedata",
    "unittest", "urllib", "uuid", "venv", "warnings", "wave", "weakref", "webbrowser",
    "winreg", "wsgiref", "xml", "xmlrpc", "zipapp", "zipfile", "zipimport", "zlib",
    "zoneinfo",
];

const JDK_ROOTS: &[&str] = &["java", "javax", "jdk", "sun", "kotlin"];
const DOTNET_ROOTS: &[&str] = &["System", "Microsoft", "Windows"];
const RUST_STD_CRATES: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Whether `module` is part of the Python standard library.
pub fn is_python_stdlib(module: &str) -> bool {
    let root = module.split('.').next().unwrap_or(module);
    PYTHON_STDLIB.contains(&root)
}

/// The ecosystem an unresolved token of `language` belongs to.
pub fn classify(language: Language, token: &str) -> Ecosystem {
    match language.family() {
        Language::Python => {
            if is_python_stdlib(token) {
                Ecosystem::PythonStdlib
            } else {
                Ecosystem::Pypi
            }
        }
        Language::JavaScript => Ecosystem::Npm,
        Language::Go => {
            let first = token.split('/').next().unwrap_or(token);
            if first.contains('.') {
                Ecosystem::Go
            } else {
                Ecosystem::GoStdlib
            }
        }
        Language::Java => {
            let first = token.split('.').next().unwrap_or(token);
            if JDK_ROOTS.contains(&first) {
                Ecosystem::Jdk
            } else {
                Ecosystem::Maven
            }
        }
        Language::CSharp => {
            let first = token.split('.').next().unwrap_or(token);
            if DOTNET_ROOTS.contains(&first) {
                Ecosystem::Dotnet
            } else {
                Ecosystem::Nuget
            }
        }
        Language::Php => Ecosystem::Composer,
        Language::Ruby => Ecosystem::Gem,
        Language::Rust => {
            let first = token.split("::").next().unwrap_or(token);
            if RUST_STD_CRATES.contains(&first) {
                Ecosystem::RustStd
            } else {
                Ecosystem::Crates
            }
        }
        _ => Ecosystem::System,
    }
}
