use std::path::Path;
use std::process::ExitCode;

use color_print::cprintln;

use asm::context::AssemblerContext;
use asm::error::Error;
use asm::{output, parser};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(name = "avrasm", version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.S")]
    input: String,

    /// Output file
    #[clap(short, long, default_value = "output.hex")]
    output: String,

    /// Dump the label map and section listing
    #[clap(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args = Args::parse();
    println!("AVR Assembler");

    let mut ctx = AssemblerContext::new();

    println!("1. Parse Files");
    println!("  < {}", args.input);
    if let Err(err) = parser::parse_file(&mut ctx, Path::new(&args.input), 0, 0) {
        return fail(err, &ctx);
    }
    println!(
        "  - {} section(s), {} label(s), {} macro(s), {} data blob(s)",
        ctx.sections.len(),
        ctx.labels.len(),
        ctx.macros.len(),
        ctx.blobs.len()
    );

    println!("2. Resolve Labels & Encode");
    let hex = match output::emit(&ctx) {
        Ok(hex) => hex,
        Err(err) => return fail(err, &ctx),
    };

    println!("3. Write Intel HEX");
    println!("  > {}", args.output);
    if let Err(err) = std::fs::write(&args.output, &hex) {
        return fail(Error::FileWrite(args.output.clone(), err), &ctx);
    }

    if args.dump {
        dump(&ctx);
    }
    ExitCode::SUCCESS
}

fn fail(err: Error, ctx: &AssemblerContext) -> ExitCode {
    err.print_diag(&ctx.files);
    ExitCode::FAILURE
}

fn dump(ctx: &AssemblerContext) {
    println!("------------------------------------------------------");
    for (name, addr) in ctx.labels.iter() {
        cprintln!("  <green>{:04X}</> {}:", addr, name);
    }
    for section in &ctx.sections {
        cprintln!(
            "  <blue>{:04X}</> section, {} instruction(s)",
            section.origin,
            section.insts.len()
        );
        for inst in &section.insts {
            let operands: Vec<&str> = inst.operands.iter().map(|op| op.text()).collect();
            cprintln!(
                "    [{:04X}] <red>{:<6}</><blue>{}</>",
                inst.address,
                inst.mnemonic.to_lowercase(),
                operands.join(" ")
            );
        }
    }
    for blob in &ctx.blobs {
        cprintln!("  <yellow>{:04X}</> data, {} byte(s)", blob.address, blob.data.len());
    }
    println!("------------------------------------------------------");
}
