// generates man page from clap CLI definition
// outputs to man/ccond.1

use ccond::cli::Cli;
use clap::CommandFactory;
use clap_mangen::Man;

fn main() -> std::io::Result<()> {
    let cmd = Cli::command();
    let man = Man::new(cmd);

    std::fs::create_dir_all("man")?;

    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    std::fs::write("man/ccond.1", buffer)?;

    println!("Generated man/ccond.1");
    Ok(())
}
