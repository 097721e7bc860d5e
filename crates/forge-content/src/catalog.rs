//! The standard course catalog.
//!
//! The taxonomy is fixed: 5 units, 3 themes each, 5 concept terms per theme.
//! Generation and validation both key off this structure, so it is built
//! up front rather than discovered as the run progresses.

use crate::model::{Concept, CourseInfo, CourseTree, Theme, Unit};

/// Builds the standard course taxonomy with all unit and theme titles and
/// the concept terms attached to each theme.
///
/// # Examples
///
/// ```
/// use forge_content::catalog::standard_course;
///
/// let course = standard_course();
/// assert_eq!(course.units.len(), 5);
/// assert_eq!(course.theme_count(), 15);
/// assert_eq!(course.element_count(), 75);
/// ```
#[must_use]
pub fn standard_course() -> CourseTree {
    let units = vec![
        unit(
            1,
            "Fundamentos del Diseño Instruccional en la Era de la IA",
            [
                (
                    "Del Aula Física al Ecosistema Digital: Paradigmas de la Educación Virtual",
                    [
                        "Distancia transaccional",
                        "Constructivismo digital",
                        "Conectivismo",
                        "Aprendizaje asincrónico",
                        "Ecosistema de aprendizaje",
                    ],
                ),
                (
                    "Modelos Pedagógicos para el Aprendizaje en Línea: Constructivismo, Conectivismo y ABS",
                    [
                        "Constructivismo Social",
                        "Zona de Desarrollo Próximo",
                        "Conectivismo",
                        "Aprendizaje Basado en Soluciones",
                        "Modelo ABCDE",
                    ],
                ),
                (
                    "Introducción a la IA Generativa como Copiloto Pedagógico",
                    [
                        "IA Generativa",
                        "Co-piloto vs Piloto Automático",
                        "Prompt Engineering Pedagógico",
                        "Curación Crítica",
                        "Amplificación de Capacidad",
                    ],
                ),
            ],
        ),
        unit(
            2,
            "Arquitectura de Cursos Virtuales de Calidad",
            [
                (
                    "Estándares de Calidad: Quality Matters Framework",
                    [
                        "Estándares QM",
                        "Alineamiento constructivo",
                        "Evaluación auténtica",
                        "Diseño inclusivo",
                        "Accesibilidad digital",
                    ],
                ),
                (
                    "Alineamiento Curricular y Objetivos de Aprendizaje",
                    [
                        "Alineamiento ABCDE",
                        "Objetivos SMART",
                        "Competencias medibles",
                        "Rúbricas claras",
                        "Evaluación integral",
                    ],
                ),
                (
                    "Diseño de Experiencias de Aprendizaje Coherentes",
                    [
                        "Experiencia integral",
                        "Coherencia pedagógica",
                        "Progresión conceptual",
                        "Andamiaje estructurado",
                        "Retroalimentación formativa",
                    ],
                ),
            ],
        ),
        unit(
            3,
            "Creación de Contenidos Educativos con IA",
            [
                (
                    "Diseño de Prompts Pedagógicos Efectivos",
                    [
                        "Ingeniería de prompts",
                        "Especificidad pedagógica",
                        "Contexto educativo",
                        "Criterios de calidad",
                        "Iteración refinada",
                    ],
                ),
                (
                    "Generación de Narrativas y Casos de Estudio",
                    [
                        "Narrativas pedagógicas",
                        "Casos auténticos",
                        "Dilemas educativos",
                        "Reflexión crítica",
                        "Personajes realistas",
                    ],
                ),
                (
                    "Producción de Videos Educativos con IA",
                    [
                        "Guiones de video",
                        "Lenguaje conversacional",
                        "Ejemplos contextuales",
                        "Claridad visual",
                        "Ritmo pedagógico",
                    ],
                ),
            ],
        ),
        unit(
            4,
            "Evaluación y Curación Crítica en Entornos Mediados por IA",
            [
                (
                    "Evaluaciones Auténticas Diseñadas con IA",
                    [
                        "Autenticidad pedagógica",
                        "Rúbricas analíticas",
                        "Evaluación formativa",
                        "Retroalimentación personalizada",
                        "Coevaluación",
                    ],
                ),
                (
                    "Curación Crítica de Contenido Generado por IA",
                    [
                        "Verificación de precisión",
                        "Blindaje cognitivo",
                        "Corrección pedagógica",
                        "Enriquecimiento contextual",
                        "Atribución y ética",
                    ],
                ),
                (
                    "Marcos de Evaluación de Calidad: QM, Bloom y ABCDE",
                    [
                        "Marco Quality Matters",
                        "Taxonomía de Bloom",
                        "Modelo ABCDE",
                        "Evaluación multidimensional",
                        "Mejora continua",
                    ],
                ),
            ],
        ),
        unit(
            5,
            "Implementación y Mejora Continua de Cursos Virtuales",
            [
                (
                    "Montaje de Cursos en LMS y Publicación",
                    [
                        "Configuración LMS",
                        "Estructura de navegación",
                        "Accesibilidad técnica",
                        "Integración de herramientas",
                        "Testing de funcionalidad",
                    ],
                ),
                (
                    "Análisis de Datos y Analítica Educativa",
                    [
                        "Learning analytics",
                        "Indicadores de éxito",
                        "Métricas de engagement",
                        "Análisis de abandono",
                        "Dashboard de monitoreo",
                    ],
                ),
                (
                    "Iteración Continua y Comunidades de Práctica",
                    [
                        "Ciclo de mejora",
                        "Feedback de estudiantes",
                        "Comunidades de aprendizaje",
                        "Redes profesionales",
                        "Reflexión colaborativa",
                    ],
                ),
            ],
        ),
    ];

    CourseTree {
        info: CourseInfo::default(),
        units,
    }
}

/// Definition for a concept term, with a generic fallback for terms that
/// have no curated definition.
#[must_use]
pub fn concept_definition(term: &str) -> String {
    let curated = match term {
        "Distancia transaccional" => {
            "Brecha psicológica y comunicativa entre docente y estudiante en educación a distancia"
        }
        "Constructivismo digital" => {
            "Construcción activa de conocimiento en entornos virtuales mediante interacción reflexiva"
        }
        "Conectivismo" => {
            "Aprendizaje como construcción de redes de conexiones entre personas, recursos e ideas"
        }
        "Aprendizaje asincrónico" => {
            "Diseño flexible de experiencias educativas con puntos de sincronización estratégicamente ubicados"
        }
        "Ecosistema de aprendizaje" => {
            "Sistema integrado e interdependiente de elementos educativos que trabajan sinérgicamente"
        }
        "Zona de Desarrollo Próximo" => {
            "Espacio entre lo que un estudiante puede hacer solo y lo que puede hacer con apoyo"
        }
        "IA Generativa" => {
            "Sistemas que crean contenido nuevo basados en patrones de datos masivos mediante redes neuronales"
        }
        "Curación Crítica" => {
            "Evaluación, verificación, corrección y enriquecimiento sistemático de contenido generado por IA"
        }
        _ => return format!("Concepto pedagógico fundamental en educación virtual: {term}"),
    };
    curated.to_string()
}

fn unit<const N: usize>(
    unit_number: u32,
    title: &str,
    topics: [(&str, [&str; 5]); N],
) -> Unit {
    let themes = topics
        .into_iter()
        .enumerate()
        .map(|(i, (theme_title, terms))| {
            let concepts = terms
                .into_iter()
                .map(|t| Concept::new(t, concept_definition(t)))
                .collect();
            Theme::new(unit_number, u32::try_from(i).unwrap_or(0) + 1, theme_title, concepts)
        })
        .collect();
    Unit {
        unit_number,
        title: title.to_string(),
        themes,
    }
}

// ============================================================================
// Tests
// ============================================================================
