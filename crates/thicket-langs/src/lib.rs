#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Built-in languages.
//!
//! Each language is a hand-written LR table, built once on first use and
//! shared afterwards.

use std::sync::LazyLock;

use thicket_core::Language;

mod arithmetic;
mod list;


macro_rules! define_langs {
    (
        $(
            $fn_name:ident => {
                build: $build:path,
                names: [$($alias:literal),* $(,)?],
                extensions: [$($ext:literal),* $(,)?] $(,)?
            }
        ),* $(,)?
    ) => {
        $(
            pub fn $fn_name() -> Language {
                static LANG: LazyLock<Language> = LazyLock::new(|| {
                    $build().expect("built-in language table is valid")
                });
                LANG.clone()
            }
        )*

        pub fn from_name(s: &str) -> Option<Language> {
            match s.to_ascii_lowercase().as_str() {
                $(
                    $($alias)|* => Some($fn_name()),
                )*
                _ => None,
            }
        }

        pub fn from_ext(ext: &str) -> Option<Language> {
            match ext.to_ascii_lowercase().as_str() {
                $(
                    $($ext)|* => Some($fn_name()),
                )*
                _ => None,
            }
        }

        pub fn all() -> Vec<Language> {
            vec![$($fn_name(),)*]
        }
    };
}

define_langs! {
    arithmetic => {
        build: arithmetic::build,
        names: ["arithmetic", "arith", "calc"],
        extensions: ["calc", "arith"],
    },
    list => {
        build: list::build,
        names: ["list", "lists"],
        extensions: ["list"],
    },
}
