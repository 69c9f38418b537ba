pub fn run() {
    let langs = thicket_langs::all();
    println!("Supported languages ({}):", langs.len());
    for lang in langs {
        println!(
            "  {} (abi {}, {} symbols, {} states)",
            lang.name(),
            lang.abi_version(),
            lang.symbol_count(),
            lang.state_count()
        );
    }
}
