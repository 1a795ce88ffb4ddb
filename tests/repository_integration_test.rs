// ==========================================
// 仓储层集成测试
// ==========================================
// 同一组用例分别跑在 SQLite 与内存两个后端上, 两者行为必须一致
// ==========================================


use chrono::Duration;
use study_planner::domain::{NewScheduleItem, NewTask, Priority};
use study_planner::engine::ScheduleRepositories;
use study_planner::repository::RepositoryError;
use test_helpers::{at, seed_assignment, seed_task, sqlite_repos, today};
use uuid::Uuid;

fn both_backends(check: impl Fn(&ScheduleRepositories)) {
    let (_temp_file, sqlite) = sqlite_repos();
    check(&sqlite);
    check(&ScheduleRepositories::in_memory());
}

#[test]
fn test_task_order_increments_per_assignment() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Essay", Priority::High, 0);
        let b = seed_assignment(repos, "Lab", Priority::Low, 1);

        let a1 = seed_task(repos, &a, 30);
        let a2 = seed_task(repos, &a, 45);
        let b1 = seed_task(repos, &b, 20);

        assert_eq!(a1.order + 1, a2.order);
        assert_eq!(b1.order, a1.order);

        let listed = repos.task_repo.list_by_assignment(a.id).unwrap();
        let ids: Vec<_> = listed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
    });
}

#[test]
fn test_create_task_for_missing_assignment_fails() {
    both_backends(|repos| {
        let result = repos.task_repo.create(NewTask {
            assignment_id: 9_999,
            description: "orphan".to_string(),
            time_allocation: 10,
        });
        assert!(result.is_err());
    });
}

#[test]
fn test_swap_order_exchanges_positions() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Essay", Priority::High, 0);
        let first = seed_task(repos, &a, 30);
        let second = seed_task(repos, &a, 45);
        let third = seed_task(repos, &a, 15);

        repos.task_repo.swap_order(first.id, third.id).unwrap();

        let ids: Vec<_> = repos
            .task_repo
            .list_by_assignment(a.id)
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    });
}

#[test]
fn test_incomplete_listing_skips_completed_tasks() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Essay", Priority::High, 0);
        let done = seed_task(repos, &a, 30);
        let open = seed_task(repos, &a, 45);

        let mut finished = done.clone();
        finished.completed = true;
        repos.task_repo.update(&finished).unwrap();

        let incomplete = repos.task_repo.list_incomplete_by_assignment(a.id).unwrap();
        assert_eq!(incomplete.len(), 1);
        assert_eq!(incomplete[0].id, open.id);
    });
}

#[test]
fn test_delete_assignment_cascades_to_tasks_and_items() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Essay", Priority::High, 0);
        let task = seed_task(repos, &a, 30);
        repos
            .schedule_item_repo
            .replace_for_day(
                today(),
                vec![NewScheduleItem {
                    task_id: task.id,
                    start_time: at(0, 9, 0),
                    end_time: at(0, 9, 30),
                    run_id: Uuid::new_v4(),
                }],
            )
            .unwrap();

        assert!(repos.assignment_repo.delete(a.id).unwrap());

        assert!(repos.assignment_repo.find_by_id(a.id).unwrap().is_none());
        assert!(repos.task_repo.find_by_id(task.id).unwrap().is_none());
        assert!(repos.schedule_item_repo.list_by_day(today()).unwrap().is_empty());

        // 再删一次返回 false
        assert!(!repos.assignment_repo.delete(a.id).unwrap());
    });
}

#[test]
fn test_update_missing_assignment_returns_not_found() {
    both_backends(|repos| {
        let mut ghost = seed_assignment(repos, "Ghost", Priority::Medium, 0);
        repos.assignment_repo.delete(ghost.id).unwrap();
        ghost.title = "still gone".to_string();

        let err = repos.assignment_repo.update(&ghost).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    });
}

#[test]
fn test_replace_for_day_clears_previous_run_including_spill() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Project", Priority::High, 3);
        let short = seed_task(repos, &a, 60);
        let long = seed_task(repos, &a, 600);

        // 第一次运行: 第二个块溢出到次日
        let first_run = Uuid::new_v4();
        repos
            .schedule_item_repo
            .replace_for_day(
                today(),
                vec![
                    NewScheduleItem {
                        task_id: short.id,
                        start_time: at(0, 16, 0),
                        end_time: at(0, 17, 0),
                        run_id: first_run,
                    },
                    NewScheduleItem {
                        task_id: long.id,
                        start_time: at(1, 9, 0),
                        end_time: at(1, 19, 0),
                        run_id: first_run,
                    },
                ],
            )
            .unwrap();
        assert_eq!(repos.schedule_item_repo.list_by_day(today()).unwrap().len(), 1);
        let next_day = today() + Duration::days(1);
        assert_eq!(repos.schedule_item_repo.list_by_day(next_day).unwrap().len(), 1);

        // 第二次运行覆盖当天, 同批次溢出项一并清除
        let second_run = Uuid::new_v4();
        let saved = repos
            .schedule_item_repo
            .replace_for_day(
                today(),
                vec![NewScheduleItem {
                    task_id: short.id,
                    start_time: at(0, 10, 0),
                    end_time: at(0, 11, 0),
                    run_id: second_run,
                }],
            )
            .unwrap();

        assert_eq!(saved.len(), 1);
        let day_items = repos.schedule_item_repo.list_by_day(today()).unwrap();
        assert_eq!(day_items.len(), 1);
        assert_eq!(day_items[0].run_id, second_run);
        assert!(repos.schedule_item_repo.list_by_day(next_day).unwrap().is_empty());
    });
}

#[test]
fn test_regenerating_next_day_keeps_previous_day_and_its_spill() {
    both_backends(|repos| {
        let essay = seed_assignment(repos, "Essay", Priority::High, 3);
        let lab = seed_assignment(repos, "Lab", Priority::Low, 4);
        let evening = seed_task(repos, &essay, 60);
        let spilled = seed_task(repos, &essay, 60);
        let other = seed_task(repos, &lab, 30);
        let tomorrow = today() + Duration::days(1);

        // 当天 17:00 开始, 第二个任务滚动到次日 09:00
        let today_run = Uuid::new_v4();
        repos
            .schedule_item_repo
            .replace_for_day(
                today(),
                vec![
                    NewScheduleItem {
                        task_id: evening.id,
                        start_time: at(0, 17, 0),
                        end_time: at(0, 18, 0),
                        run_id: today_run,
                    },
                    NewScheduleItem {
                        task_id: spilled.id,
                        start_time: at(1, 9, 0),
                        end_time: at(1, 10, 0),
                        run_id: today_run,
                    },
                ],
            )
            .unwrap();

        let tomorrow_run = Uuid::new_v4();
        repos
            .schedule_item_repo
            .replace_for_day(
                tomorrow,
                vec![NewScheduleItem {
                    task_id: other.id,
                    start_time: at(1, 13, 0),
                    end_time: at(1, 13, 30),
                    run_id: tomorrow_run,
                }],
            )
            .unwrap();

        let day_items = repos.schedule_item_repo.list_by_day(today()).unwrap();
        assert_eq!(day_items.len(), 1);
        assert_eq!(day_items[0].task_id, evening.id);

        let next_items = repos.schedule_item_repo.list_by_day(tomorrow).unwrap();
        let runs: Vec<_> = next_items.iter().map(|item| item.run_id).collect();
        assert_eq!(runs, vec![today_run, tomorrow_run]);

        // 再次生成次日只替换次日自己的日程
        repos
            .schedule_item_repo
            .replace_for_day(tomorrow, Vec::new())
            .unwrap();
        let next_items = repos.schedule_item_repo.list_by_day(tomorrow).unwrap();
        assert_eq!(next_items.len(), 1);
        assert_eq!(next_items[0].task_id, spilled.id);
        assert_eq!(repos.schedule_item_repo.list_by_day(today()).unwrap().len(), 1);
    });
}

#[test]
fn test_replace_for_day_keeps_other_days() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Reading", Priority::Low, 5);
        let task = seed_task(repos, &a, 30);
        let tomorrow = today() + Duration::days(1);

        repos
            .schedule_item_repo
            .replace_for_day(
                tomorrow,
                vec![NewScheduleItem {
                    task_id: task.id,
                    start_time: at(1, 9, 0),
                    end_time: at(1, 9, 30),
                    run_id: Uuid::new_v4(),
                }],
            )
            .unwrap();
        repos
            .schedule_item_repo
            .replace_for_day(today(), Vec::new())
            .unwrap();

        assert_eq!(repos.schedule_item_repo.list_by_day(tomorrow).unwrap().len(), 1);
    });
}

#[test]
fn test_set_completed_by_task_updates_all_items() {
    both_backends(|repos| {
        let a = seed_assignment(repos, "Essay", Priority::High, 0);
        let task = seed_task(repos, &a, 30);
        let run_id = Uuid::new_v4();
        repos
            .schedule_item_repo
            .replace_for_day(
                today(),
                vec![
                    NewScheduleItem {
                        task_id: task.id,
                        start_time: at(0, 9, 0),
                        end_time: at(0, 9, 30),
                        run_id,
                    },
                    NewScheduleItem {
                        task_id: task.id,
                        start_time: at(0, 14, 0),
                        end_time: at(0, 14, 30),
                        run_id,
                    },
                ],
            )
            .unwrap();

        let changed = repos
            .schedule_item_repo
            .set_completed_by_task(task.id, true)
            .unwrap();
        assert_eq!(changed, 2);
        assert!(repos
            .schedule_item_repo
            .list_by_task(task.id)
            .unwrap()
            .iter()
            .all(|item| item.completed));
    });
}

#[test]
fn test_set_completed_cascade_reaches_tasks_and_items() {
    both_backends(|repos| {
        let essay = seed_assignment(repos, "Essay", Priority::High, 0);
        let lab = seed_assignment(repos, "Lab", Priority::Low, 2);
        let outline = seed_task(repos, &essay, 30);
        let draft = seed_task(repos, &essay, 45);
        let other = seed_task(repos, &lab, 20);
        let run_id = Uuid::new_v4();
        repos
            .schedule_item_repo
            .replace_for_day(
                today(),
                vec![
                    NewScheduleItem {
                        task_id: outline.id,
                        start_time: at(0, 9, 0),
                        end_time: at(0, 9, 30),
                        run_id,
                    },
                    NewScheduleItem {
                        task_id: draft.id,
                        start_time: at(0, 9, 30),
                        end_time: at(0, 10, 15),
                        run_id,
                    },
                    NewScheduleItem {
                        task_id: other.id,
                        start_time: at(0, 10, 15),
                        end_time: at(0, 10, 35),
                        run_id,
                    },
                ],
            )
            .unwrap();

        let changed = repos
            .assignment_repo
            .set_completed_cascade(essay.id, true)
            .unwrap();
        assert_eq!(changed, 2);

        assert!(repos.assignment_repo.find_by_id(essay.id).unwrap().unwrap().completed);
        assert!(repos
            .task_repo
            .list_by_assignment(essay.id)
            .unwrap()
            .iter()
            .all(|t| t.completed));
        for item in repos.schedule_item_repo.list_by_day(today()).unwrap() {
            assert_eq!(item.completed, item.task_id != other.id);
        }
        assert!(!repos.assignment_repo.find_by_id(lab.id).unwrap().unwrap().completed);

        // 作业不存在时不改任何数据
        let err = repos
            .assignment_repo
            .set_completed_cascade(9_999, false)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert!(repos.task_repo.find_by_id(draft.id).unwrap().unwrap().completed);
    });
}
