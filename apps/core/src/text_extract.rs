//! Text extraction module for various file formats
//! Supports: TXT, MD, CSV, JSON, PDF, DOCX

use tracing::{info, warn};

use crate::error::AppError;

/// Extract text content from binary file data based on file extension
pub fn extract_text_from_file(file_name: &str, file_data: &[u8]) -> Result<String, AppError> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    info!("Extracting text from file: {} (type: {})", file_name, extension);

    match extension.as_str() {
        // Plain text formats - direct UTF-8 conversion
        "txt" | "md" | "csv" | "json" => String::from_utf8(file_data.to_vec())
            .map_err(|e| AppError::Validation(format!("Invalid UTF-8 content: {}", e))),

        // PDF extraction
        "pdf" => extract_pdf_text(file_data),

        // DOCX extraction
        "docx" | "doc" => extract_docx_text(file_data),

        _ => Err(AppError::Validation(format!(
            "Unsupported file extension: {}",
            extension
        ))),
    }
}

/// Extract text from PDF file
fn extract_pdf_text(file_data: &[u8]) -> Result<String, AppError> {
    info!("Extracting text from PDF...");

    match pdf_extract::extract_text_from_mem(file_data) {
        Ok(text) => {
            let cleaned = clean_extracted_text(&text);
            info!("PDF extraction successful: {} characters", cleaned.len());
            Ok(cleaned)
        }
        Err(e) => {
            warn!("PDF extraction failed: {}", e);
            Err(AppError::Validation(format!(
                "Failed to extract PDF text: {}",
                e
            )))
        }
    }
}

/// Extract text from DOCX file
fn extract_docx_text(file_data: &[u8]) -> Result<String, AppError> {
    info!("Extracting text from DOCX...");

    match docx_rs::read_docx(file_data) {
        Ok(docx) => {
            let mut text_parts: Vec<String> = Vec::new();

            // Extract text from document body
            for child in docx.document.children {
                if let docx_rs::DocumentChild::Paragraph(para) = child {
                    let para_text: String = para
                        .children
                        .iter()
                        .filter_map(|pc| {
                            if let docx_rs::ParagraphChild::Run(run) = pc {
                                Some(
                                    run.children
                                        .iter()
                                        .filter_map(|rc| {
                                            if let docx_rs::RunChild::Text(t) = rc {
                                                Some(t.text.clone())
                                            } else {
                                                None
                                            }
                                        })
                                        .collect::<Vec<_>>()
                                        .join(""),
                                )
                            } else {
                                None
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("");

                    if !para_text.trim().is_empty() {
                        text_parts.push(para_text);
                    }
                }
            }

            let text = text_parts.join("\n");
            let cleaned = clean_extracted_text(&text);
            info!("DOCX extraction successful: {} characters", cleaned.len());
            Ok(cleaned)
        }
        Err(e) => {
            warn!("DOCX extraction failed: {}", e);
            Err(AppError::Validation(format!(
                "Failed to extract DOCX text: {}",
                e
            )))
        }
    }
}

/// Clean up extracted text
fn clean_extracted_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
