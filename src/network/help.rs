//! Static help text returned for Help requests

/// Command listing sent in every HelpData response
pub const HELP_TEXT: &str = "\
put <path>          upload a local file to the server, e.g. put file.txt
get <name>          download a file from the server, e.g. get file.txt
change <old> <new>  rename a file on the server, e.g. change a.txt b.txt
help                list the commands the server supports
bye                 close the connection and exit";
