//! TXT/PDF summary renderer for finalized requests.

use crate::error::{PortalError, Result};
use crate::providers::{ArtifactKind, DocumentRenderer};
use crate::state::{DetailSet, Role, VpnRequest};
use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 5.0;
const FONT_SIZE_PT: f32 = 10.0;

/// Summary renderer.
///
/// Produces the same line-oriented summary as plain text or as a PDF with a
/// built-in Helvetica font. Both formats present the two sides in full, with
/// no reconciliation of mismatched parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRenderer;

impl SummaryRenderer {
    /// Create a new summary renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn lines(request: &VpnRequest, remote: &DetailSet, local: &DetailSet) -> Vec<String> {
        let mut lines = vec![
            format!("Finalized VPN: {}", request.vpn_name),
            format!("Type: {}", request.vpn_type),
            format!("Request id: {}", request.id),
            format!("Created: {}", request.created_at.to_rfc3339()),
            format!("Justification: {}", request.justification),
            String::new(),
        ];

        for (role, detail) in [(Role::Local, local), (Role::Remote, remote)] {
            lines.push(format!("=== {} side ===", capitalize(role.as_str())));
            lines.push(format!(
                "Contact: {} <{}>",
                detail.contact_name, detail.contact_email
            ));
            lines.push(format!("Gateway: {}", detail.gateway));
            lines.push(format!("IKE version: {}", detail.ike_version));
            lines.push(format!(
                "Phase 1: {} / {} / DH group {} / {}s",
                detail.phase1.encryption,
                detail.phase1.authentication,
                detail.phase1.dh_group,
                detail.phase1.lifetime_secs,
            ));
            lines.push(format!(
                "Phase 2: {} / {} / {}s / PFS {}",
                detail.phase2.encryption,
                detail.phase2.hash,
                detail.phase2.lifetime_secs,
                if detail.phase2.pfs { "on" } else { "off" },
            ));
            lines.push(format!("Protected subnets: {}", detail.subnets.join(", ")));
            if !detail.notes.is_empty() {
                lines.push(format!("Notes: {}", detail.notes));
            }
            if let Some(at) = request.agreed_at(role) {
                lines.push(format!("Agreed at: {}", at.to_rfc3339()));
            }
            lines.push(String::new());
        }

        lines
    }

    fn render_txt(lines: &[String]) -> Vec<u8> {
        let mut out = lines.join("\n");
        out.push('\n');
        out.into_bytes()
    }

    fn render_pdf(title: &str, lines: &[String]) -> Result<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "summary");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PortalError::Render(format!("PDF font error: {e}")))?;

        let mut layer_ref = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

        for line in lines {
            if y < MARGIN_MM {
                let (next_page, next_layer) =
                    doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "summary");
                layer_ref = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM;
            }
            if !line.is_empty() {
                layer_ref.use_text(line.clone(), FONT_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= LINE_HEIGHT_MM;
        }

        doc.save_to_bytes()
            .map_err(|e| PortalError::Render(format!("PDF serialization error: {e}")))
    }
}

impl DocumentRenderer for SummaryRenderer {
    fn render(
        &self,
        request: &VpnRequest,
        remote: &DetailSet,
        local: &DetailSet,
        kind: ArtifactKind,
    ) -> Result<Vec<u8>> {
        let lines = Self::lines(request, remote, local);
        match kind {
            ArtifactKind::Txt => Ok(Self::render_txt(&lines)),
            ArtifactKind::Pdf => Self::render_pdf(&request.vpn_name, &lines),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
