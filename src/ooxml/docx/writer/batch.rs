//! Rendering independent parts in parallel.
//!
//! Each [`RenderJob`] owns its content tree and its registry, so jobs never
//! share mutable state. Parts of one document that must draw ids from the
//! same registry can each hold a clone of a
//! [`SharedRelationships`](crate::ooxml::opc::rel::SharedRelationships).
use rayon::prelude::*;

use super::context::SectionContext;
use super::node::Node;
use super::render::DocumentRenderer;
use crate::ooxml::error::Result;
use crate::ooxml::opc::rel::{RelationshipRegistry, Relationships};

/// Which part a job renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Document,
    Header,
    Footer,
}

/// One part to render.
#[derive(Debug)]
pub struct RenderJob<'a, R = Relationships> {
    pub ctx: &'a SectionContext,
    pub part: PartKind,
    pub nodes: Vec<Node>,
    pub registry: R,
}

/// Output of a job: the part XML and the registry it was rendered against.
#[derive(Debug)]
pub struct RenderedPart<R = Relationships> {
    pub part: PartKind,
    pub xml: String,
    pub registry: R,
}

impl<'a, R: RelationshipRegistry> RenderJob<'a, R> {
    pub fn new(ctx: &'a SectionContext, part: PartKind, nodes: Vec<Node>, registry: R) -> Self {
        Self {
            ctx,
            part,
            nodes,
            registry,
        }
    }

    pub fn render(mut self) -> Result<RenderedPart<R>> {
        let renderer = DocumentRenderer::new(self.ctx);
        let xml = match self.part {
            PartKind::Document => renderer.render(&mut self.nodes, &mut self.registry)?,
            PartKind::Header => renderer.render_header(&mut self.nodes, &mut self.registry)?,
            PartKind::Footer => renderer.render_footer(&mut self.nodes, &mut self.registry)?,
        };
        Ok(RenderedPart {
            part: self.part,
            xml,
            registry: self.registry,
        })
    }
}

/// Render every job on the rayon pool. Results come back in job order; a
/// failing job does not affect the others.
pub fn render_batch<R>(jobs: Vec<RenderJob<'_, R>>) -> Vec<Result<RenderedPart<R>>>
where
    R: RelationshipRegistry + Send,
{
    log::debug!("rendering {} parts in parallel", jobs.len());
    jobs.into_par_iter().map(RenderJob::render).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::hyperlink::Link;
    use crate::ooxml::docx::writer::image::Image;
    use crate::ooxml::docx::writer::paragraph::Paragraph;
    use crate::ooxml::docx::writer::run::Text;
    use crate::ooxml::error::OoxmlError;
    use crate::ooxml::opc::rel::{RelationshipKind, SharedRelationships};
    use std::collections::HashSet;

    fn paragraph(text: &str) -> Node {
        Paragraph::new().child(Text::new(text)).into()
    }

    #[test]
    fn test_results_in_job_order() {
        let ctx = SectionContext::default();
        let jobs = (0..8)
            .map(|i| {
                RenderJob::new(
                    &ctx,
                    PartKind::Document,
                    vec![paragraph(&format!("document {}", i))],
                    Relationships::new(),
                )
            })
            .collect();

        let results = render_batch(jobs);
        assert_eq!(results.len(), 8);
        for (i, result) in results.into_iter().enumerate() {
            let part = result.unwrap();
            assert!(part.xml.contains(&format!("document {}<", i)));
        }
    }

    #[test]
    fn test_failing_job_is_isolated() {
        let ctx = SectionContext::default();
        let bare = SectionContext {
            default_style: None,
            ..Default::default()
        };
        let jobs = vec![
            RenderJob::new(&ctx, PartKind::Header, vec![paragraph("top")], Relationships::new()),
            RenderJob::new(
                &bare,
                PartKind::Document,
                vec![Image::new("logo.png", 10, 10).into()],
                Relationships::new(),
            ),
            RenderJob::new(&ctx, PartKind::Footer, vec![], Relationships::new()),
        ];

        let results = render_batch(jobs);
        assert!(results[0].as_ref().unwrap().xml.contains("<w:hdr"));
        assert!(matches!(results[1], Err(OoxmlError::MissingDefaultStyle)));
        assert!(results[2].as_ref().unwrap().xml.contains("<w:ftr"));
    }

    #[test]
    fn test_parts_sharing_a_registry() {
        let ctx = SectionContext::default();
        let shared = SharedRelationships::new(Relationships::new());
        let link = |target: &str| -> Node { Paragraph::new().child(Link::external("x", target)).into() };

        let jobs = vec![
            RenderJob::new(
                &ctx,
                PartKind::Document,
                vec![link("https://a.example"), link("https://b.example")],
                shared.clone(),
            ),
            RenderJob::new(&ctx, PartKind::Header, vec![link("https://a.example")], shared.clone()),
            RenderJob::new(&ctx, PartKind::Footer, vec![link("https://c.example")], shared.clone()),
        ];
        for result in render_batch(jobs) {
            result.unwrap();
        }

        let registry = shared.lock();
        let links = registry.relationships_by_kind(RelationshipKind::Link);
        assert_eq!(links.len(), 3);
        let ids: HashSet<u32> = links.iter().map(|rel| rel.id()).collect();
        assert_eq!(ids.len(), 3);
    }
}
