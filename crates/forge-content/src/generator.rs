//! Content generation and the regenerate-until-valid loop.
//!
//! Generation never fails: when no backend is configured, or the backend
//! errors, times out, or returns empty output, the deterministic template
//! path produces the element instead. Each attempt is validated in full;
//! a pure word-count miss is repaired by padding or trimming toward the
//! target and then re-validated, while structural violations trigger a fresh
//! attempt. After the attempt ceiling the best instance seen so far (fewest
//! errors) is returned, its remaining violations discoverable by running the
//! validator again.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{
    ElementInstance, ElementKind, ElementMetrics, GenerationSource, Provenance, Theme,
};
use crate::spec::ElementSpec;
use crate::text;
use crate::validator::{validate, ValidationResult};

/// Protagonist used by narrative prompts and templates.
const PROTAGONIST: &str = "Elena Martínez";

/// Render target for infographics, in pixels.
const INFOGRAPHIC_WIDTH: u32 = 1200;
const INFOGRAPHIC_HEIGHT: u32 = 900;

/// Default generation attempt ceiling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default per-call backend timeout.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(60);

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"Tiempo Total Estimado: (\d+)").unwrap()
});

// ============================================================================
// GenerateError and TextGenerator
// ============================================================================

/// Failure from a text backend. These never escape the generator; every
/// variant sends the attempt down the template path.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The backend reported an error.
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend call exceeded the configured timeout.
    #[error("backend timed out")]
    Timeout,

    /// The backend returned empty output.
    #[error("backend returned empty output")]
    Empty,
}

/// An opaque text generation capability.
///
/// Implementations produce the body for one element from a prompt. The
/// generator treats the backend as untrusted: output is measured and
/// validated like any other content.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates body text for an element of `kind` from `prompt`.
    async fn generate_text(&self, prompt: &str, kind: ElementKind)
        -> Result<String, GenerateError>;
}

// ============================================================================
// ContentGenerator
// ============================================================================

/// Generates element instances for theme slots.
pub struct ContentGenerator {
    backend: Option<Arc<dyn TextGenerator>>,
    max_attempts: u32,
    backend_timeout: Duration,
}

impl ContentGenerator {
    /// A generator that only uses the deterministic template path.
    #[must_use]
    pub fn template_only() -> Self {
        Self {
            backend: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    /// A generator backed by `backend`, with the template path as fallback.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend: Some(backend),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    /// Sets the regenerate-loop attempt ceiling.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the per-call backend timeout.
    #[must_use]
    pub fn backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Generates the element for one of `theme`'s slots.
    ///
    /// Always returns an instance. Whether it satisfies `spec` can be
    /// checked by validating the returned instance.
    pub async fn generate(&self, theme: &Theme, spec: &ElementSpec) -> ElementInstance {
        let mut best: Option<(ElementInstance, usize)> = None;

        for attempt in 1..=self.max_attempts.max(1) {
            let (instance, result) = self.attempt(theme, spec, attempt).await;
            if result.valid {
                debug!(
                    kind = %spec.kind,
                    theme = %theme.code,
                    attempt,
                    words = instance.metrics.words,
                    "element accepted"
                );
                return instance;
            }
            debug!(
                kind = %spec.kind,
                theme = %theme.code,
                attempt,
                errors = result.errors.len(),
                "attempt rejected"
            );
            let error_count = result.errors.len();
            if best.as_ref().map_or(true, |(_, e)| error_count < *e) {
                best = Some((instance, error_count));
            }
        }

        // best is always set: the loop above runs at least once
        match best {
            Some((instance, error_count)) => {
                warn!(
                    kind = %spec.kind,
                    theme = %theme.code,
                    errors = error_count,
                    "attempt ceiling reached, keeping best instance"
                );
                instance
            }
            None => {
                let (title, body) = template_body(spec.kind, theme);
                self.build(theme, spec.kind, title, body, GenerationSource::Template, 1)
            }
        }
    }

    /// One generation attempt: produce, measure, validate, and repair a
    /// pure word-count miss.
    async fn attempt(
        &self,
        theme: &Theme,
        spec: &ElementSpec,
        attempt: u32,
    ) -> (ElementInstance, ValidationResult) {
        let (title, body, source) = match self.backend_body(theme, spec).await {
            Some(body) => (default_title(spec.kind, theme), body, GenerationSource::Ai),
            None => {
                let (title, body) = template_body(spec.kind, theme);
                (title, body, GenerationSource::Template)
            }
        };

        let mut instance = self.build(theme, spec.kind, title, body, source, attempt);
        let mut result = validate(&instance, spec, &theme.code);

        // A lone word-band violation is repairable in place; anything
        // structural needs a fresh attempt.
        if !result.valid && result.errors.len() == 1 {
            if let Some(band) = spec.word_band {
                if !band.contains(instance.metrics.words) {
                    let terms = theme.concept_terms();
                    let repaired = if instance.metrics.words < band.min() {
                        text::pad_to_band(&instance.body, band, &terms)
                    } else {
                        text::trim_to_band(&instance.body, band)
                    };
                    let title = instance.title;
                    instance = self.build(theme, spec.kind, title, repaired, source, attempt);
                    result = validate(&instance, spec, &theme.code);
                }
            }
        }

        (instance, result)
    }

    /// Asks the backend for a body, or `None` to fall back to the template.
    async fn backend_body(&self, theme: &Theme, spec: &ElementSpec) -> Option<String> {
        let backend = self.backend.as_ref()?;
        let prompt = build_prompt(theme, spec);

        match tokio::time::timeout(
            self.backend_timeout,
            backend.generate_text(&prompt, spec.kind),
        )
        .await
        {
            Ok(Ok(body)) if !body.trim().is_empty() => Some(body),
            Ok(Ok(_)) => {
                warn!(kind = %spec.kind, theme = %theme.code, "backend returned empty output, using template");
                None
            }
            Ok(Err(err)) => {
                warn!(kind = %spec.kind, theme = %theme.code, %err, "backend failed, using template");
                None
            }
            Err(_) => {
                warn!(kind = %spec.kind, theme = %theme.code, "backend timed out, using template");
                None
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn build(
        &self,
        theme: &Theme,
        kind: ElementKind,
        title: String,
        body: String,
        source: GenerationSource,
        attempt: u32,
    ) -> ElementInstance {
        ElementInstance {
            kind,
            metrics: measure(kind, &body, theme),
            title,
            body,
            provenance: Provenance {
                source,
                attempts: attempt,
            },
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Measurement
// ============================================================================

/// Measures a body into the metrics the validator consumes.
fn measure(kind: ElementKind, body: &str, theme: &Theme) -> ElementMetrics {
    let words = text::count_words(body);
    let terms = theme.concept_terms();
    let concepts = text::count_term_mentions(body, &terms);

    match kind {
        ElementKind::Narrative => ElementMetrics {
            words,
            concepts: Some(concepts),
            character: Some(PROTAGONIST.to_string()),
            ..Default::default()
        },
        ElementKind::AcademicText => ElementMetrics {
            words,
            concepts: Some(concepts),
            references: Some(text::count_references(body)),
            ..Default::default()
        },
        ElementKind::VideoScript => ElementMetrics {
            words,
            concepts: Some(concepts),
            visuals: Some(text::count_marker(body, "[VISUAL]")),
            examples: Some(text::count_examples(body)),
            ..Default::default()
        },
        ElementKind::Infographic => ElementMetrics {
            words,
            panels: Some(
                body.lines()
                    .filter(|l| l.trim_start().starts_with("Panel "))
                    .count(),
            ),
            width_px: Some(INFOGRAPHIC_WIDTH),
            height_px: Some(INFOGRAPHIC_HEIGHT),
            ..Default::default()
        },
        ElementKind::Activity => ElementMetrics {
            words,
            rubric_criteria: Some(
                body.lines()
                    .filter(|l| l.trim_start().starts_with("| **"))
                    .count(),
            ),
            duration_minutes: parse_duration_minutes(body),
            deliverables: Some(count_numbered_after(body, "Entregables")),
            success_criteria: Some(count_numbered_after(body, "Criterios de Éxito")),
            ..Default::default()
        },
    }
}

fn parse_duration_minutes(body: &str) -> Option<u32> {
    DURATION_RE
        .captures(body)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Counts numbered list items between `heading` and the next `###` heading.
fn count_numbered_after(body: &str, heading: &str) -> usize {
    let Some(start) = body.find(heading) else {
        return 0;
    };
    let rest = &body[start + heading.len()..];
    let section = match rest.find("\n###") {
        Some(end) => &rest[..end],
        None => rest,
    };
    section
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            trimmed
                .split_once('.')
                .is_some_and(|(head, _)| !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()))
        })
        .count()
}

// ============================================================================
// Prompts
// ============================================================================

fn default_title(kind: ElementKind, theme: &Theme) -> String {
    let prefix = match kind {
        ElementKind::Narrative => "Narrativa",
        ElementKind::AcademicText => "Texto Académico",
        ElementKind::VideoScript => "Video",
        ElementKind::Infographic => "Infografía",
        ElementKind::Activity => "Actividad Práctica",
    };
    format!("{prefix}: {}", theme.title)
}

fn build_prompt(theme: &Theme, spec: &ElementSpec) -> String {
    let terms = theme.concept_terms().join(", ");
    let band = spec
        .word_band
        .map(|b| format!("Palabras: {} ±{}. ", b.target, b.tolerance))
        .unwrap_or_default();

    match spec.kind {
        ElementKind::Narrative => format!(
            "Genera una narrativa pedagógica en tres actos para el tema {}: {}. \
             {band}Protagonista: {PROTAGONIST}. Conceptos a integrar: {terms}. \
             Tono personal con tensión narrativa.",
            theme.code, theme.title
        ),
        ElementKind::AcademicText => format!(
            "Genera un texto académico riguroso para el tema {}: {}. \
             {band}Secciones obligatorias en orden: Introducción y Conclusión. \
             Conceptos a desarrollar: {terms}. Incluye citas a autores reconocidos \
             (Moore, Piaget, Vygotsky, Siemens).",
            theme.code, theme.title
        ),
        ElementKind::VideoScript => format!(
            "Genera un guion de video educativo de 5 minutos para el tema {}: {}. \
             {band}Alterna marcadores [NARRACIÓN] y [VISUAL], con al menos dos \
             [VISUAL] y 2-3 ejemplos concretos. Conceptos: {terms}.",
            theme.code, theme.title
        ),
        ElementKind::Infographic => format!(
            "Describe una infografía radial para el tema {}: {}. \
             Entre 4 y 6 paneles, uno por línea con el prefijo 'Panel N:'. \
             Conceptos: {terms}.",
            theme.code, theme.title
        ),
        ElementKind::Activity => format!(
            "Genera una actividad práctica de 60 minutos para el tema {}: {}. \
             Secciones obligatorias en orden: Objetivo, Instrucciones, Rúbrica, \
             Entregables. Rúbrica de 4-5 criterios en tabla markdown y lista \
             numerada de entregables. Cierra con 'Tiempo Total Estimado: 60 minutos'.",
            theme.code, theme.title
        ),
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Returns term `i` from the theme, cycling when fewer terms exist.
fn term<'a>(terms: &[&'a str], i: usize) -> &'a str {
    if terms.is_empty() {
        "educación virtual"
    } else {
        terms[i % terms.len()]
    }
}

fn template_body(kind: ElementKind, theme: &Theme) -> (String, String) {
    match kind {
        ElementKind::Narrative => narrative_template(theme),
        ElementKind::AcademicText => academic_template(theme),
        ElementKind::VideoScript => video_template(theme),
        ElementKind::Infographic => infographic_template(theme),
        ElementKind::Activity => activity_template(theme),
    }
}

fn narrative_template(theme: &Theme) -> (String, String) {
    let terms = theme.concept_terms();
    let title = format!("Narrativa: {}", theme.title);
    let body = format!(
        "# Narrativa Pedagógica: {title_theme}

## {title_theme}

El último día en el aula 302, la Profesora {PROTAGONIST} se encontraba de pie frente a sus
treinta estudiantes, observando sus rostros con la mezcla de nostalgia y esperanza que solo
genera una transición importante. Durante quince años, estas aulas habían sido su hogar
profesional, el espacio donde sus palabras cobraban vida.

Pero hoy era diferente. La pandemia había acelerado lo inevitable: la transformación digital
de la educación. Mientras revisaba sus notas de clase manuscritas, Elena se enfrentaba a una
pregunta que la había mantenido despierta varias noches: ¿cómo podría mantener la calidez
del aula física en un ecosistema digital?

Los conceptos que había aprendido en la capacitación —{t0}, {t1}, {t2}— resonaban en su
mente, pero parecían abstractos, lejanos de la realidad de sus estudiantes.

Sin embargo, conforme los días avanzaban y Elena comenzaba a diseñar su primer curso virtual,
descubrió algo inesperado. No era la tecnología la que transformaba la educación, sino la
intención pedagógica. {t3} no buscaba reemplazar al profesor, sino amplificar su capacidad
de conexión. {t4} no era una limitación, sino una oportunidad para diseñar interacciones
más reflexivas.

Elena comprendió que la enseñanza virtual no significaba abandonar lo que había construido
en el aula 302. Significaba evolucionar, adaptarse, mantener la esencia del aprendizaje
mientras navegaba nuevas aguas. Y así, con determinación renovada, Elena comenzó su viaje
hacia la transformación digital de su práctica docente.",
        title_theme = theme.title,
        t0 = term(&terms, 0),
        t1 = term(&terms, 1),
        t2 = term(&terms, 2),
        t3 = term(&terms, 3),
        t4 = term(&terms, 4),
    );
    (title, body)
}

fn academic_template(theme: &Theme) -> (String, String) {
    let terms = theme.concept_terms();
    let title = format!("Texto Académico: {}", theme.title);
    let body = format!(
        "## {title_theme}

### Introducción

La educación en el siglo XXI enfrenta transformaciones sin precedentes. Los conceptos de
{t0}, {t1} y {t2} representan marcos teóricos fundamentales para comprender la complejidad
de los entornos educativos contemporáneos. Esta sección examina cómo estos constructos se
entrelazan con los desafíos y oportunidades de la educación virtual.

### {t0}

{t0} representa un aspecto central de la teoría educativa moderna. La investigación de
Moore (1991) estableció que la distancia educativa no es meramente física, sino psicológica
y comunicativa. En contextos virtuales, esta dimensión requiere diseño intencional de
interacciones que cierren la brecha entre docente y estudiante.

### {t1}

{t1} proporciona un marco para entender cómo los estudiantes construyen significado en
ambientes de aprendizaje. Según Piaget (1954), el aprendizaje activo implica interacción
constante entre el individuo y su entorno. En educación virtual, esto significa crear
experiencias donde el estudiante es protagonista de su construcción de conocimiento.

### {t2}

{t2} enfatiza la importancia de las interacciones sociales en el aprendizaje. Vygotsky
(1978) propuso que el aprendizaje es fundamentalmente un proceso social, mediado por la
cultura y el lenguaje. Las plataformas virtuales ofrecen nuevas posibilidades para estas
interacciones, aunque requieren diseño cuidadoso para ser efectivas.

### Síntesis y Aplicación

La integración de estos conceptos en diseño instruccional virtual demanda un equilibrio
entre pedagogía fundamentada y pragmatismo tecnológico. Profesionales educativos deben
considerar cómo {t3} y {t4} se manifiestan en sus contextos específicos, adaptando
principios generales a realidades particulares.

### Conclusión

La comprensión profunda de estos marcos teóricos permite a diseñadores instruccionales
crear experiencias educativas más efectivas, accesibles y transformadoras en contextos
virtuales.",
        title_theme = theme.title,
        t0 = term(&terms, 0),
        t1 = term(&terms, 1),
        t2 = term(&terms, 2),
        t3 = term(&terms, 3),
        t4 = term(&terms, 4),
    );
    (title, body)
}

fn video_template(theme: &Theme) -> (String, String) {
    let terms = theme.concept_terms();
    let title = format!("Video: {}", theme.title);
    let body = format!(
        "[NARRACIÓN]: Hola, soy tu guía en este viaje de transformación educativa.
Hoy exploraremos cómo {t0} puede revolucionar tu práctica docente.
[VISUAL]: Pantalla con título \"{title_theme}\" y animación de transformación

[NARRACIÓN]: En los últimos años, los educadores enfrentamos un dilema cada vez más común:
¿cómo mantenemos la calidad y autenticidad de nuestra enseñanza mientras navegamos espacios
cada vez más virtuales? La respuesta radica en comprender algunos conceptos clave.
[VISUAL]: Animación mostrando tres conceptos clave con iconos representativos

[NARRACIÓN]: Primero, consideremos {t0}. Este concepto reconoce que la mera distancia
física no define la brecha educativa. Lo que realmente importa es cómo diseñamos las
interacciones para cerrarla. Un ejemplo claro: un foro bien moderado acerca más que una
videollamada desatendida.
[VISUAL]: Gráfico comparando distancia física y distancia pedagógica con ejemplos

[NARRACIÓN]: Segundo, {t1} nos propone que el aprendizaje verdadero es activo. No es el
docente transmitiendo información, sino el estudiante construyendo significado a través de
la interacción, la reflexión y la experiencia.
[VISUAL]: Video de ejemplo mostrando estudiantes interactuando en una plataforma virtual

[NARRACIÓN]: Tercero, {t2} enfatiza la importancia de las redes y conexiones. En educación
virtual, estas conexiones no son solo entre personas, sino también entre recursos, ideas y
comunidades de práctica globales.
[VISUAL]: Mapa de red expandiéndose con conexiones entre nodos

[NARRACIÓN]: Lo crucial es integrar estos conceptos en tu diseño instruccional. No es
tecnología por tecnología, sino pedagogía fundamentada, mediada estratégicamente por
herramientas digitales.
[VISUAL]: Ciclo de diseño instruccional mostrando la integración de conceptos

[NARRACIÓN]: Ahora que entiendes la base teórica, ¿estás listo para transformar tu curso?
En el siguiente módulo aplicaremos estos principios a la creación de contenido real.
[VISUAL]: Cierre con texto \"Próximo: Aplicación práctica\"",
        title_theme = theme.title,
        t0 = term(&terms, 0),
        t1 = term(&terms, 1),
        t2 = term(&terms, 2),
    );
    (title, body)
}

fn infographic_template(theme: &Theme) -> (String, String) {
    let title = format!("Infografía: {}", theme.title);
    let mut body = format!(
        "# Infografía: {}\n\nFormato radial con el tema al centro y un panel por concepto.\n\n",
        theme.title
    );
    for (i, concept) in theme.concepts.iter().take(5).enumerate() {
        body.push_str(&format!(
            "Panel {}: {} — {}\n",
            i + 1,
            concept.term,
            concept.definition
        ));
    }
    if theme.concepts.is_empty() {
        for i in 1..=4 {
            body.push_str(&format!("Panel {i}: {} — aspecto clave {i}\n", theme.title));
        }
    }
    (title, body)
}

fn activity_template(theme: &Theme) -> (String, String) {
    let title = format!("Actividad Práctica: {}", theme.title);
    let body = "## Auditoría Pedagógica Interactiva

### Objetivo
Aplicar los conceptos clave de este tema analizando críticamente un curso virtual existente
e identificando oportunidades de mejora basadas en principios pedagógicos rigurosos.

### Instrucciones

#### Parte 1: Selección de Curso (10 minutos)
Selecciona un curso virtual de tu institución o del repositorio recomendado.
Completa la tabla de identificación básica del curso.

#### Parte 2: Análisis Estructurado (25 minutos)
Completa la tabla de análisis evaluando cada dimensión: alineamiento pedagógico, diseño de
interacciones, accesibilidad y claridad, evidencia de constructo teórico, oportunidades de
mejora.

#### Parte 3: Reflexión Crítica (15 minutos)
Escribe una reflexión de 150-200 palabras respondiendo:
1. ¿Qué fortalezas pedagógicas identificaste?
2. ¿Qué limitaciones observaste?
3. ¿Cómo aplicarías conceptos de este tema para mejorar el curso?

#### Parte 4: Propuesta de Mejora (10 minutos)
Diseña 2-3 intervenciones específicas basadas en los conceptos del tema.

### Rúbrica de Evaluación

| Criterio | Excepcional (5) | Competente (4) | Desarrollando (3) | Inicial (1) |
|----------|-----------------|----------------|-------------------|-------------|
| **Análisis completo** | 5+ elementos analizados con profundidad | 4 elementos | 2-3 elementos | 1 o menos |
| **Fundamentación teórica** | Vincula explícitamente a 3+ conceptos | Vincula a 2 | Vincula a 1 | Sin fundamentación |
| **Propuestas de mejora** | 3+ propuestas concretas y fundamentadas | 2 concretas | 1 general | Sin propuestas |
| **Reflexión crítica** | Análisis profundo y equilibrado | Análisis razonado | Observaciones superficiales | Reflexión mínima |
| **Claridad y presentación** | Excelente | Buena | Aceptable | Necesita mejora |

### Entregables Esperados
1. Tabla de análisis completa
2. Reflexión de 150-200 palabras
3. 2-3 propuestas de mejora fundamentadas
4. Evidencia de auto-evaluación

### Criterios de Éxito
1. Identifica evidencia de conceptos en el curso analizado
2. Propone mejoras concretas y fundamentadas
3. La reflexión demuestra comprensión profunda
4. El análisis es equilibrado entre fortalezas y limitaciones
5. Vinculación explícita a teoría educativa

### Tiempo Total Estimado: 60 minutos
"
    .to_string();
    (title, body)
}

// ============================================================================
// Tests
// ============================================================================
