//! Generates object identifier constants.
//!
//! Provide object identifiers in dotted-decimal notation and you will
//! receive the octet array with their content octets, ready to paste
//! into a `ConstOid` definition.

use std::env;
use std::process::exit;
use bermap::Oid;

fn process_one(arg: &str) -> Result<(), bermap::oid::ParseOidError> {
    let oid: Oid = arg.parse()?;
    let mut first = true;
    print!("[");
    for octet in oid.as_slice() {
        if !first {
            print!(", ");
        }
        else {
            first = false
        }
        print!("{}", octet);
    }
    println!("]");
    Ok(())
}

fn main() {
    let mut failed = false;
    let mut args = env::args();
    args.next(); // Skip the executable name.
    for arg in args {
        if let Err(err) = process_one(arg.as_ref()) {
            println!("{}: {}.", arg, err);
            failed = true;
        }
    }
    if failed {
        exit(1)
    }
}
