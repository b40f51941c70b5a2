pub mod read_pdf_tool;
